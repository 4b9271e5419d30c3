use anyhow::{Result, anyhow, bail};
use comfy_table::{Cell, Table};

use crate::cli::PresetCommands;
use crate::output::OutputFormat;
use crate::output::json::print_json;
use crate::output::table::print_table;
use chatbench_core::PresetClient;
use chatbench_models::{GenerationParameters, NewPreset, Preset};

pub async fn run(client: PresetClient, command: PresetCommands, format: OutputFormat) -> Result<()> {
    match command {
        PresetCommands::List => list_presets(&client, format).await,
        PresetCommands::Show { preset } => show_preset(&client, &preset, format).await,
        PresetCommands::Save { name, params } => {
            let mut generation = GenerationParameters::default();
            params.apply(&mut generation);
            save_preset(&client, NewPreset::new(name, generation), format).await
        }
        PresetCommands::Update { id, name, params } => {
            let existing = client
                .get(id)
                .await
                .ok_or_else(|| anyhow!("Preset not found: {}", id))?;
            let mut generation = existing.params;
            params.apply(&mut generation);
            let preset = NewPreset::new(name.unwrap_or(existing.name), generation);
            update_preset(&client, id, preset, format).await
        }
        PresetCommands::Delete { id } => delete_preset(&client, id, format).await,
    }
}

async fn list_presets(client: &PresetClient, format: OutputFormat) -> Result<()> {
    let presets = client.list().await;

    if format.is_json() {
        return print_json(&presets);
    }

    if presets.is_empty() {
        println!("No presets found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name"]);
    for preset in presets {
        table.add_row(vec![Cell::new(preset.id), Cell::new(preset.name)]);
    }

    print_table(table)
}

async fn show_preset(client: &PresetClient, name_or_id: &str, format: OutputFormat) -> Result<()> {
    let preset = client
        .find(name_or_id)
        .await
        .ok_or_else(|| anyhow!("Preset not found: {}", name_or_id))?;

    if format.is_json() {
        return print_json(&preset);
    }

    print_preset(&preset);
    Ok(())
}

fn print_preset(preset: &Preset) {
    let params = &preset.params.completion;
    println!("ID:                {}", preset.id);
    println!("Name:              {}", preset.name);
    println!("Model:             {}", params.model);
    println!("Temperature:       {}", params.temperature);
    println!("Max tokens:        {}", params.max_tokens);
    println!("Top p:             {}", params.top_p);
    println!("Presence penalty:  {}", params.presence_penalty);
    println!("Frequency penalty: {}", params.frequency_penalty);
    println!("N:                 {}", params.n);
    println!("System message:    {}", preset.params.system_message);
}

async fn save_preset(client: &PresetClient, preset: NewPreset, format: OutputFormat) -> Result<()> {
    preset.params.validate()?;
    let Some(id) = client.create(&preset).await else {
        bail!("Failed to save preset {}", preset.name);
    };

    if format.is_json() {
        return print_json(&serde_json::json!({ "id": id, "name": preset.name }));
    }

    println!("Preset saved: {} ({})", preset.name, id);
    Ok(())
}

async fn update_preset(
    client: &PresetClient,
    id: u64,
    preset: NewPreset,
    format: OutputFormat,
) -> Result<()> {
    preset.params.validate()?;
    if !client.update(id, &preset).await {
        bail!("Failed to update preset {}", id);
    }

    if format.is_json() {
        return print_json(&preset.into_preset(id));
    }

    println!("Preset updated: {} ({})", preset.name, id);
    Ok(())
}

async fn delete_preset(client: &PresetClient, id: u64, format: OutputFormat) -> Result<()> {
    if !client.delete(id).await {
        bail!("Preset not found: {}", id);
    }

    if format.is_json() {
        return print_json(&serde_json::json!({ "deleted": id }));
    }

    println!("Preset deleted: {}", id);
    Ok(())
}
