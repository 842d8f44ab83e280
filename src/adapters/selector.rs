use crate::domain::model::Organization;
use crate::domain::ports::Selector;
use crate::utils::error::{AuditError, Result};
use std::io::{BufRead, Write};
use std::sync::Mutex;

/// 解析 "1, 3" 這類以逗號分隔、從 1 起算的序號；無法解析或超出範圍的項目忽略。
pub fn parse_selection(input: &str, candidates: &[Organization]) -> Vec<Organization> {
    let mut selected: Vec<Organization> = Vec::new();
    for part in input.split(',') {
        let Ok(index) = part.trim().parse::<usize>() else {
            continue;
        };
        let Some(org) = index.checked_sub(1).and_then(|i| candidates.get(i)) else {
            continue;
        };
        if !selected.iter().any(|s| s.id == org.id) {
            selected.push(org.clone());
        }
    }
    selected
}

/// Picks organizations by id, e.g. from repeated `--org` flags.
#[derive(Debug, Clone)]
pub struct FixedSelector {
    ids: Vec<String>,
}

impl FixedSelector {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }
}

impl Selector for FixedSelector {
    fn select(&self, candidates: &[Organization]) -> Result<Vec<Organization>> {
        let mut selected = Vec::new();
        for id in &self.ids {
            match candidates.iter().find(|c| &c.id == id) {
                Some(org) if !selected.contains(org) => selected.push(org.clone()),
                Some(_) => {}
                None => tracing::warn!("Organization {} is not available for this login", id),
            }
        }
        if selected.is_empty() {
            return Err(AuditError::EmptySelection);
        }
        Ok(selected)
    }
}

/// Interactive numbered menu over any reader/writer pair.
pub struct ConsoleSelector<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl ConsoleSelector<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn prompt(&self, candidates: &[Organization]) -> Result<String> {
        let mut out = self.output.lock().map_err(|_| poisoned())?;
        writeln!(out, "\nOrganizations:")?;
        for (i, org) in candidates.iter().enumerate() {
            writeln!(out, " {}. {} ({})", i + 1, org.display_name(), org.id)?;
        }
        write!(out, "Select (comma-separated): ")?;
        out.flush()?;

        let mut line = String::new();
        self.input
            .lock()
            .map_err(|_| poisoned())?
            .read_line(&mut line)?;
        Ok(line)
    }
}

fn poisoned() -> AuditError {
    AuditError::IoError(std::io::Error::other("console lock poisoned"))
}

impl<R: BufRead, W: Write> Selector for ConsoleSelector<R, W> {
    fn select(&self, candidates: &[Organization]) -> Result<Vec<Organization>> {
        let line = self.prompt(candidates)?;
        let selected = parse_selection(&line, candidates);
        if selected.is_empty() {
            return Err(AuditError::EmptySelection);
        }
        Ok(selected)
    }
}
