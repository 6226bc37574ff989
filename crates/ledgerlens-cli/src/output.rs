//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use ledgerlens_pipeline::DocumentSummary;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the document listing.
    pub fn format_documents(&self, documents: &[DocumentSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_documents_json(documents),
            OutputFormat::Table => Ok(self.format_documents_table(documents)),
            OutputFormat::Quiet => Ok(documents
                .iter()
                .map(|d| d.file_name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_documents_json(&self, documents: &[DocumentSummary]) -> Result<String> {
        let json: Vec<serde_json::Value> = documents
            .iter()
            .map(|d| {
                serde_json::json!({
                    "file_name": d.file_name,
                    "document": d.document.as_str(),
                    "cached": d.cached,
                    "loaded": d.loaded,
                    "processing": d.processing,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_documents_table(&self, documents: &[DocumentSummary]) -> String {
        if documents.is_empty() {
            return self.colorize("No documents uploaded.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["File", "Document", "Graph", "Status"]);

        for doc in documents {
            let graph = if doc.cached { "cached" } else { "-" };
            let status = if doc.processing {
                "processing"
            } else if doc.loaded {
                "ready"
            } else {
                "not processed"
            };
            builder.push_record([doc.file_name.as_str(), doc.document.as_str(), graph, status]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format one progress stage.
    pub fn progress(&self, fraction: f32, text: &str) -> String {
        let percent = format!("[{:>3.0}%]", fraction * 100.0);
        format!("{} {}", self.colorize(&percent, "cyan"), text)
    }

    /// Format an answer from the model.
    pub fn answer(&self, text: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({ "answer": text }).to_string(),
            _ => text.to_string(),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
