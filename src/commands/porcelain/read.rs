use crate::areas::repository::Repository;
use crate::artifacts::core::PagerWriter;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::CommitRecord;
use anyhow::Context;
use colored::Colorize;
use derive_new::new;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::ops::ControlFlow;

#[derive(Debug, Clone, Default, new)]
pub struct ReadOptions {
    /// Show only this commit instead of walking from HEAD
    pub start: Option<String>,
    pub limit: Option<NonZeroUsize>,
    pub oneline: bool,
    pub abbrev_commit: bool,
}

impl Repository {
    pub fn read(&self, opts: &ReadOptions) -> anyhow::Result<()> {
        let rev_list = RevList::new(
            self.executor(),
            self.path().to_path_buf(),
            opts.start.clone(),
            opts.limit,
        );

        let mut shown = 0usize;
        let outcome = rev_list
            .traverse(|record| {
                let displayed = if opts.oneline {
                    self.show_commit_oneline(record, opts.abbrev_commit)
                } else {
                    self.show_commit_medium(record, opts.abbrev_commit, shown > 0)
                };

                match displayed {
                    Ok(()) => {
                        shown += 1;
                        Ok(ControlFlow::Continue(()))
                    }
                    // the reader of our output went away
                    Err(error) if error.kind() == io::ErrorKind::BrokenPipe => {
                        Ok(ControlFlow::Break(()))
                    }
                    Err(error) => Err(error.into()),
                }
            })
            .context("could not read history")?;

        tracing::debug!(?outcome, shown, "read finished");
        Ok(())
    }

    /// Send further output through the configured pager, if any
    pub fn start_pager(&self) -> anyhow::Result<()> {
        if let Some(pager) = self.settings().pager() {
            let writer = PagerWriter::spawn(self.executor().clone(), pager)?;
            self.replace_writer(Box::new(writer));
        }
        Ok(())
    }

    fn show_commit_medium(
        &self,
        commit: &CommitRecord,
        abbrev_commit: bool,
        separate: bool,
    ) -> io::Result<()> {
        let mut writer = self.writer();
        if separate {
            writeln!(writer)?;
        }

        writeln!(
            writer,
            "{}",
            format!("commit {}", abbrev_commit_id(commit, abbrev_commit)).yellow()
        )?;
        writeln!(writer, "Author: {}", commit.author.display_name())?;
        writeln!(writer, "Date:   {}", commit.author.readable_timestamp())?;
        writeln!(writer)?;
        for message_line in commit.body.lines() {
            writeln!(writer, "    {}", message_line)?;
        }

        Ok(())
    }

    fn show_commit_oneline(&self, commit: &CommitRecord, abbrev_commit: bool) -> io::Result<()> {
        writeln!(
            self.writer(),
            "{} {}",
            abbrev_commit_id(commit, abbrev_commit).yellow(),
            commit.short_message()
        )
    }
}

fn abbrev_commit_id(commit: &CommitRecord, abbrev_commit: bool) -> String {
    if abbrev_commit {
        commit.oid.to_short_oid()
    } else {
        commit.oid.to_hex()
    }
}
