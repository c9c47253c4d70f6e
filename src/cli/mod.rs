// cli/mod.rs — Client subcommand runners.
//
// Each runner issues one HTTP request against a running server and prints a
// human-readable summary. Non-success responses are printed raw (status
// code plus body) with no interpretation and no retries.

pub mod client;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use client::ApiClient;

/// Print one task as a block of labeled lines. The description line is
/// omitted when the task has none.
fn print_task(task: &Value) {
    println!("-------------------");
    println!("id: [{}]", task["id"]);
    println!("title: {}", task["titulo"].as_str().unwrap_or(""));
    println!("status: {}", task["status"].as_str().unwrap_or(""));
    println!("created at: {}", task["criado_em"].as_str().unwrap_or(""));
    if let Some(descricao) = task["descricao"].as_str() {
        if !descricao.is_empty() {
            println!("description: {descricao}");
        }
    }
}

fn print_error(status: StatusCode, body: &Value) {
    eprintln!("error: {} {}", status.as_u16(), body);
}

pub async fn run_create(
    base_url: &str,
    title: String,
    description: String,
    status: String,
) -> Result<()> {
    let client = ApiClient::new(base_url)?;
    let (code, body) = client.create_task(&title, &description, &status).await?;
    if code == StatusCode::CREATED {
        println!("task created:");
        print_task(&body);
    } else {
        print_error(code, &body);
    }
    Ok(())
}

pub async fn run_list(base_url: &str) -> Result<()> {
    let client = ApiClient::new(base_url)?;
    let (code, body) = client.list_tasks().await?;
    if code != StatusCode::OK {
        print_error(code, &body);
        return Ok(());
    }
    let tasks = body.as_array().cloned().unwrap_or_default();
    if tasks.is_empty() {
        println!("no tasks found.");
        return Ok(());
    }
    for task in &tasks {
        print_task(task);
    }
    Ok(())
}

pub async fn run_get(base_url: &str, id: i64) -> Result<()> {
    let client = ApiClient::new(base_url)?;
    let (code, body) = client.get_task(id).await?;
    if code == StatusCode::OK {
        print_task(&body);
    } else {
        print_error(code, &body);
    }
    Ok(())
}

pub async fn run_update(
    base_url: &str,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let mut fields = serde_json::Map::new();
    if let Some(title) = title {
        fields.insert("titulo".to_owned(), Value::String(title));
    }
    if let Some(description) = description {
        fields.insert("descricao".to_owned(), Value::String(description));
    }
    if let Some(status) = status {
        fields.insert("status".to_owned(), Value::String(status));
    }
    // Short-circuit before any request; the server would reject it anyway.
    if fields.is_empty() {
        eprintln!("nothing to update. use --title/--description/--status.");
        return Ok(());
    }

    let client = ApiClient::new(base_url)?;
    let (code, body) = client.update_task(id, Value::Object(fields)).await?;
    if code == StatusCode::OK {
        println!("task updated.");
    } else {
        print_error(code, &body);
    }
    Ok(())
}

pub async fn run_delete(base_url: &str, id: i64) -> Result<()> {
    let client = ApiClient::new(base_url)?;
    let (code, body) = client.delete_task(id).await?;
    if code == StatusCode::OK {
        println!("task deleted.");
    } else {
        print_error(code, &body);
    }
    Ok(())
}
