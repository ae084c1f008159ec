//! Line-oriented interactive session over the dashboard filters.
//!
//! Each command that changes the filter state re-evaluates the whole state
//! against the cached base dataset, the way the dashboard re-runs on every
//! widget change.

use anyhow::{Result, anyhow, bail};
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::analyzers::aggregate::build_report;
use crate::cache::DatasetCache;
use crate::dimensions::{ALL_DATA, column_for, selector_options};
use crate::filter::{FilterState, Selection, distinct_values};
use crate::output::{caption, export_view, render_report};

pub const HELP: &str = "\
commands:
  dimension <name>                 choose the primary dimension (or 'All Data')
  values <v1,v2,...|all|none>      choose primary values
  relation <name> = <v1,...|all|none>
                                   choose values of a related filter
  reset                            back to 'All Data'
  show                             current filters and their options
  summary                          dashboard figures for the current filters
  export [dir]                     write the filtered rides to CSV
  help                             this text
  quit                             leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dimension(String),
    Values(Selection),
    Relation { name: String, selection: Selection },
    Reset,
    Show,
    Summary,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "dimension" | "dim" if !rest.is_empty() => Command::Dimension(rest.to_string()),
            "values" if !rest.is_empty() => Command::Values(Selection::parse(rest)),
            "dimension" | "dim" => bail!("expected: dimension <name>"),
            "values" => bail!("expected: values <v1,v2,...|all|none>"),
            "relation" | "rel" => {
                let (name, values) = rest
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected: relation <name> = <values>"))?;
                Command::Relation {
                    name: name.trim().to_string(),
                    selection: Selection::parse(values),
                }
            }
            "reset" => Command::Reset,
            "show" => Command::Show,
            "summary" => Command::Summary,
            "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => bail!("unrecognized command '{line}', try 'help'"),
        };
        Ok(command)
    }
}

/// What the session has to say after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub struct Session<'c> {
    cache: &'c DatasetCache,
    source: PathBuf,
    export_dir: PathBuf,
    state: FilterState,
}

impl<'c> Session<'c> {
    pub fn new(cache: &'c DatasetCache, source: &Path, export_dir: &Path) -> Self {
        Self {
            cache,
            source: source.to_path_buf(),
            export_dir: export_dir.to_path_buf(),
            state: FilterState::default(),
        }
    }

    pub fn with_state(mut self, state: FilterState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Dimension(name) => {
                if name != ALL_DATA && column_for(&name).is_none() {
                    bail!(
                        "unknown dimension '{name}', choose one of: {}",
                        selector_options().join(", ")
                    );
                }
                self.state = FilterState::for_dimension(&name);
                self.refresh()
            }
            Command::Values(selection) => {
                if self.state.is_all_data() {
                    bail!("choose a dimension before selecting values");
                }
                self.state.values = selection;
                self.refresh()
            }
            Command::Relation { name, selection } => {
                let previous = self.state.relations.insert(name.clone(), selection);
                if let Err(e) = self.state.validate() {
                    match previous {
                        Some(old) => self.state.relations.insert(name, old),
                        None => self.state.relations.remove(&name),
                    };
                    return Err(e.into());
                }
                self.refresh()
            }
            Command::Reset => {
                self.state = FilterState::default();
                self.refresh()
            }
            Command::Show => self.panel().map(Reply::Text),
            Command::Summary => {
                let dataset = self.cache.get_or_load(&self.source)?;
                let evaluation = self.state.evaluate(&dataset)?;
                Ok(Reply::Text(render_report(&build_report(
                    &self.state.dimension,
                    &evaluation,
                ))))
            }
            Command::Export(dir) => {
                let dataset = self.cache.get_or_load(&self.source)?;
                let evaluation = self.state.evaluate(&dataset)?;
                if evaluation.view.is_empty() {
                    return Ok(Reply::Text("No data matches the selected filters".to_string()));
                }
                let dir = dir.as_deref().unwrap_or(self.export_dir.as_path());
                let path = export_view(&evaluation.view, dir, false)?;
                Ok(Reply::Text(format!(
                    "exported {} rides to {}",
                    evaluation.view.len(),
                    path.display()
                )))
            }
            Command::Help => Ok(Reply::Text(HELP.to_string())),
            Command::Quit => Ok(Reply::Quit),
        }
    }

    /// Re-evaluates the current state and reports the resulting row count.
    fn refresh(&self) -> Result<Reply> {
        let dataset = self.cache.get_or_load(&self.source)?;
        let evaluation = self.state.evaluate(&dataset)?;
        Ok(Reply::Text(caption(&self.state.dimension, evaluation.view.len())))
    }

    /// Describes the current selections and the options each one offers.
    fn panel(&self) -> Result<String> {
        let dataset = self.cache.get_or_load(&self.source)?;
        let mut out = String::new();

        writeln!(out, "Analyze by: {}", self.state.dimension)?;
        let Some(column) = column_for(&self.state.dimension) else {
            writeln!(out, "  options: {}", selector_options().join(", "))?;
            return Ok(out);
        };

        let options = distinct_values(&dataset.view(), column);
        writeln!(out, "Select {}: {}", self.state.dimension, describe(&self.state.values))?;
        writeln!(out, "  {} options", options.len())?;

        let evaluation = self.state.evaluate(&dataset)?;
        if evaluation.applied.is_empty() {
            return Ok(out);
        }

        writeln!(out, "Related Insights")?;
        for offered in &evaluation.offered {
            let selection = self
                .state
                .relations
                .get(offered.name)
                .cloned()
                .unwrap_or_default();
            writeln!(
                out,
                "  {}: {}  [options: {}]",
                offered.name,
                describe(&selection),
                offered.options.join(", ")
            )?;
        }
        Ok(out)
    }

    /// Reads commands from `input` until `quit` or end of input.
    ///
    /// Command errors are reported and the session continues.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        info!(source = %self.source.display(), "Session started");
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let reply = line.parse::<Command>().and_then(|c| self.execute(c));
            match reply {
                Ok(Reply::Text(text)) => writeln!(output, "{text}")?,
                Ok(Reply::Quit) => break,
                Err(e) => {
                    warn!(error = %e, "Session command failed");
                    writeln!(output, "error: {e:#}")?;
                }
            }
            output.flush()?;
        }
        info!("Session ended");
        Ok(())
    }
}

fn describe(selection: &Selection) -> String {
    match selection {
        Selection::All => "all".to_string(),
        Selection::Only(values) if values.is_empty() => "none (no restriction)".to_string(),
        Selection::Only(values) => values.join(", "),
    }
}
