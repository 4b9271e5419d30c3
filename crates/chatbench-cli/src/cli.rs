use std::path::PathBuf;

use chatbench_models::GenerationParameters;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

#[derive(Parser)]
#[command(name = "chatbench")]
#[command(version, about = "chatbench - stream chat completions and manage presets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL (defaults to the config file, then http://localhost:3001)
    #[arg(long, global = true, env = "CHATBENCH_SERVER_URL")]
    pub server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Send a message and stream the reply
    Chat(ChatArgs),

    /// Preset management
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Message to send (read from stdin when omitted)
    pub message: Option<String>,

    /// Preset to load parameters from, by name or id
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Earlier conversation to continue, as a JSON message array
    #[arg(short, long)]
    pub transcript: Option<PathBuf>,

    /// Write the final transcript to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    #[command(flatten)]
    pub params: ParamArgs,
}

/// Overrides for individual generation parameters.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub top_p: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    pub presence_penalty: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    pub frequency_penalty: Option<f32>,

    /// Number of choices to request
    #[arg(short = 'n', long)]
    pub n: Option<u32>,

    /// System message
    #[arg(short, long)]
    pub system: Option<String>,
}

impl ParamArgs {
    pub fn apply(&self, params: &mut GenerationParameters) {
        let completion = &mut params.completion;
        if let Some(model) = &self.model {
            completion.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            completion.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            completion.max_tokens = max_tokens;
        }
        if let Some(top_p) = self.top_p {
            completion.top_p = top_p;
        }
        if let Some(penalty) = self.presence_penalty {
            completion.presence_penalty = penalty;
        }
        if let Some(penalty) = self.frequency_penalty {
            completion.frequency_penalty = penalty;
        }
        if let Some(n) = self.n {
            completion.n = n;
        }
        if let Some(system) = &self.system {
            params.system_message = system.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum PresetCommands {
    /// List presets
    List,

    /// Show a preset
    Show {
        /// Preset name or id
        preset: String,
    },

    /// Save a new preset from defaults plus overrides
    Save {
        name: String,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Change fields of an existing preset
    Update {
        id: u64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Delete a preset
    Delete { id: u64 },
}
