use colored::*;
use log::warn;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::manager::ResumeManager;
use crate::processor::{extract_text, validate_resume};
use crate::providers::traits::CompletionProvider;

/// Dispatches REPL input: known commands act on the resume store, and
/// everything else is treated as a question for the assistant.
pub struct CommandHandler {
    manager: ResumeManager,
    provider: Arc<dyn CompletionProvider>,
}

impl CommandHandler {
    pub fn new(manager: ResumeManager, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { manager, provider }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        let mut parts = input.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or("").trim();

        match command {
            "help" => {
                self.print_help();
                Ok(())
            }
            "list" => {
                self.list_resumes();
                Ok(())
            }
            "add" => self.add_resumes(rest).await,
            "remove" => self.remove_resume(rest).await,
            "summary" => self.summarize(rest).await,
            "skill" => self.find_skill(rest),
            "export" => self.export_metadata(rest),
            "new" => {
                self.manager.clear_conversation();
                println!("{}", "Started a new conversation.".green());
                Ok(())
            }
            "clear" => {
                self.manager.clear_all_resumes();
                println!("{}", "Removed all resumes.".green());
                Ok(())
            }
            _ => {
                let answer = self.manager.query(input).await;
                println!("\n{}\n", answer.cyan());
                Ok(())
            }
        }
    }

    fn print_help(&self) {
        println!("{}", "Available commands:".yellow().bold());
        println!("  {} {}", "add <file>...".green(), "upload one or more resumes (PDF, DOCX, TXT)");
        println!("  {} {}", "list".green(), "         show uploaded resumes");
        println!("  {} {}", "remove <id>".green(), "  remove a resume");
        println!("  {} {}", "summary <id>".green(), " detailed summary of one candidate");
        println!("  {} {}", "skill <term>".green(), " candidates with a given skill");
        println!("  {} {}", "export <file>".green(), "write all resume metadata as JSON");
        println!("  {} {}", "new".green(), "          start a new conversation");
        println!("  {} {}", "clear".green(), "        remove all resumes");
        println!("  {} {}", "exit".green(), "         quit");
        println!("\nAnything else is asked as a question about the resumes.");
    }

    fn list_resumes(&self) {
        let all = self.manager.get_all_metadata();
        if all.is_empty() {
            println!("{}", "No resumes uploaded yet.".yellow());
            return;
        }
        println!("{}", format!("{} resume(s):", all.len()).yellow().bold());
        for (id, metadata) in all {
            println!(
                "  {} {} | {} | {} years",
                id.green(),
                metadata.candidate_name.bold(),
                metadata.current_role,
                metadata.experience_years
            );
        }
    }

    /// Upload a batch of files. Each path is processed independently so a
    /// bad file does not abort the rest of the batch.
    async fn add_resumes(&mut self, rest: &str) -> Result<(), String> {
        if rest.is_empty() {
            return Err("Usage: add <file> [<file>...]".to_string());
        }

        for path in rest.split_whitespace() {
            if let Err(e) = self.add_one_resume(path).await {
                warn!("skipping {}: {}", path, e);
                println!("{}", format!("✗ {}: {}", path, e).red());
            }
        }
        Ok(())
    }

    async fn add_one_resume(&mut self, path: &str) -> Result<(), String> {
        let filename = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| "invalid path".to_string())?
            .to_string();

        let bytes = fs::read(path).map_err(|e| format!("cannot read file: {}", e))?;
        let text = extract_text(&bytes, &filename).map_err(|e| e.to_string())?;

        let validation = validate_resume(self.provider.as_ref(), &text).await;
        if !validation.is_valid {
            return Err(format!("not accepted as a resume: {}", validation.reason));
        }

        let (id, metadata) = self
            .manager
            .add_resume_text(text, &filename)
            .await
            .map_err(|e| e.to_string())?;
        println!(
            "{}",
            format!("✓ added {} as {}", metadata.candidate_name, id).green()
        );
        Ok(())
    }

    async fn remove_resume(&mut self, rest: &str) -> Result<(), String> {
        if rest.is_empty() {
            return Err("Usage: remove <id>".to_string());
        }
        match self.manager.remove_resume(rest).await {
            Ok(true) => {
                println!("{}", format!("Removed {}", rest).green());
                Ok(())
            }
            Ok(false) => Err(format!("No resume with ID '{}'", rest)),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn summarize(&mut self, rest: &str) -> Result<(), String> {
        if rest.is_empty() {
            return Err("Usage: summary <id>".to_string());
        }
        let summary = self.manager.summarize_resume(rest).await;
        println!("\n{}\n", summary.cyan());
        Ok(())
    }

    /// Dump the extracted metadata for every resume, keyed by id.
    fn export_metadata(&self, rest: &str) -> Result<(), String> {
        if rest.is_empty() {
            return Err("Usage: export <file>".to_string());
        }
        let all: std::collections::BTreeMap<String, _> =
            self.manager.get_all_metadata().into_iter().collect();
        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| format!("cannot serialize metadata: {}", e))?;
        fs::write(rest, json).map_err(|e| format!("cannot write {}: {}", rest, e))?;
        println!(
            "{}",
            format!("Exported {} resume(s) to {}", all.len(), rest).green()
        );
        Ok(())
    }

    fn find_skill(&self, rest: &str) -> Result<(), String> {
        if rest.is_empty() {
            return Err("Usage: skill <term>".to_string());
        }
        let matches = self.manager.find_candidates_with_skill(rest);
        if matches.is_empty() {
            println!("{}", format!("No candidates mention '{}'.", rest).yellow());
            return Ok(());
        }
        println!(
            "{}",
            format!("{} candidate(s) with '{}':", matches.len(), rest)
                .yellow()
                .bold()
        );
        for (id, metadata) in matches {
            println!(
                "  {} {} | {}",
                id.green(),
                metadata.candidate_name.bold(),
                metadata.key_skills.join(", ")
            );
        }
        Ok(())
    }
}
