use crate::areas::repository::Repository;
use crate::artifacts::process::Disposition;
use anyhow::Context;
use std::io::Write;

/// Directory holding the chat space's own files, tracked in history
pub const CHAT_DIR: &str = ".git-chat";

/// Path of the chat space configuration, relative to the repository root
pub const CONFIG_PATH: &str = ".git-chat/config";

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        let config_path = self.path().join(CONFIG_PATH);
        if config_path.exists() {
            anyhow::bail!("{} is already a chat space", self.path().display());
        }

        self.run_git(["init", "--quiet"], Disposition::Null)?;

        let chat_dir = self.path().join(CHAT_DIR);
        std::fs::create_dir_all(&chat_dir)
            .with_context(|| format!("Unable to create {}", chat_dir.display()))?;

        let name = self
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chat".to_string());
        std::fs::write(&config_path, format!("[channel \"{name}\"]\n\tdescription = {name}\n"))
            .with_context(|| format!("Unable to write {}", config_path.display()))?;

        // committing the configuration starts the first line of history
        self.run_git(["add", "--", CONFIG_PATH], Disposition::Null)?;
        self.run_git(
            ["commit", "--quiet", "-m", "Create chat space"],
            Disposition::Null,
        )?;

        writeln!(
            self.writer(),
            "Initialized chat space in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
