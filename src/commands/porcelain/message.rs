use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::process::Disposition;
use std::io::Write;

impl Repository {
    /// Record `text` as an empty commit on the current line of history
    pub fn message(&self, text: &str) -> anyhow::Result<()> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Aborting message due to empty text");
        }

        self.run_git(
            ["commit", "--allow-empty", "--quiet", "-m", text],
            Disposition::Null,
        )?;

        let head = self.capture_git(["rev-parse", "--verify", "HEAD"])?;
        let head = ObjectId::from_hex(&head)?;

        writeln!(
            self.writer(),
            "[{}] {}",
            head.to_short_oid(),
            text.lines().next().unwrap_or("")
        )?;

        Ok(())
    }
}
