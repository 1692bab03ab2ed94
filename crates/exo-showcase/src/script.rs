#![forbid(unsafe_code)]

//! Interaction scripts.
//!
//! One command per line; blank lines and `#` comments are skipped. Planet
//! names are resolved against the loaded dataset only when a step is
//! replayed, so a script can be parsed before the load finishes.

use std::sync::Arc;

use exo_core::{Dataset, FilterParam, PlanetRecord};
use exo_runtime::NarrativeMsg;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("script line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Year(i32),
    Select(String),
    SelectNone,
    Click { on_data_mark: bool },
    Explore,
    Back,
    Reset,
    Set(FilterParam),
    Quit,
}

impl Step {
    /// Turn the step into a message, resolving planet names in `dataset`.
    ///
    /// An unknown name resolves to a selection of nothing, which the
    /// session rejects without changing scene.
    pub fn resolve(&self, dataset: &Dataset) -> NarrativeMsg {
        match self {
            Step::Year(year) => NarrativeMsg::YearSelected(*year),
            Step::Select(name) => NarrativeMsg::RecordSelected(find_record(dataset, name)),
            Step::SelectNone => NarrativeMsg::RecordSelected(None),
            Step::Click { on_data_mark } => NarrativeMsg::BackgroundClicked {
                on_data_mark: *on_data_mark,
            },
            Step::Explore => NarrativeMsg::ExploreRequested,
            Step::Back => NarrativeMsg::BackRequested,
            Step::Reset => NarrativeMsg::ResetRequested,
            Step::Set(param) => NarrativeMsg::FilterParamChanged(param.clone()),
            Step::Quit => NarrativeMsg::Quit,
        }
    }
}

/// Exact match first, then a case-insensitive one.
fn find_record(dataset: &Dataset, name: &str) -> Option<Arc<PlanetRecord>> {
    let records = dataset.records();
    records
        .iter()
        .find(|r| r.name() == name)
        .or_else(|| records.iter().find(|r| r.name().eq_ignore_ascii_case(name)))
        .cloned()
}

/// Parse a whole script.
pub fn parse(source: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        steps.push(parse_line(line).map_err(|message| ScriptError {
            line: idx + 1,
            message,
        })?);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step, String> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    match command {
        "year" => rest
            .parse()
            .map(Step::Year)
            .map_err(|_| format!("year expects an integer, got {rest:?}")),
        "select" if rest.is_empty() => Err("select expects a planet name".into()),
        "select" => Ok(Step::Select(rest.to_owned())),
        "select-none" => no_argument(command, rest, Step::SelectNone),
        "click" => match rest {
            "" => Ok(Step::Click {
                on_data_mark: false,
            }),
            "mark" => Ok(Step::Click { on_data_mark: true }),
            other => Err(format!("click takes no argument or 'mark', got {other:?}")),
        },
        "explore" => no_argument(command, rest, Step::Explore),
        "back" => no_argument(command, rest, Step::Back),
        "reset" => no_argument(command, rest, Step::Reset),
        "quit" => no_argument(command, rest, Step::Quit),
        "set" => {
            let (name, value) = match rest.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (rest, ""),
            };
            if name.is_empty() {
                return Err("set expects a parameter name and a value".into());
            }
            FilterParam::parse(name, value)
                .map(Step::Set)
                .map_err(|e| e.to_string())
        }
        other => Err(format!("unknown command {other:?}")),
    }
}

fn no_argument(command: &str, rest: &str, step: Step) -> Result<Step, String> {
    if rest.is_empty() {
        Ok(step)
    } else {
        Err(format!("{command} takes no argument, got {rest:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exo_core::{AxisField, NumericField, Threshold};

    #[test]
    fn parses_every_command() {
        let steps = parse(
            "# guided tour\n\
             year 2015\n\
             select Kepler-452 b\n\
             select-none\n\
             click\n\
             click mark\n\
             \n\
             explore\n\
             set max_eccentricity 0.1\n\
             set x_field pl_radj\n\
             set name_query  kepler 4\n\
             reset\n\
             back\n\
             quit\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Year(2015),
                Step::Select("Kepler-452 b".into()),
                Step::SelectNone,
                Step::Click {
                    on_data_mark: false
                },
                Step::Click { on_data_mark: true },
                Step::Explore,
                Step::Set(FilterParam::Threshold(Threshold::MaxEccentricity, 0.1)),
                Step::Set(FilterParam::XField(AxisField::PlanetRadius)),
                Step::Set(FilterParam::NameQuery("kepler 4".into())),
                Step::Reset,
                Step::Back,
                Step::Quit,
            ]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("explore\n\nyear soon\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("integer"));
        assert!(err.to_string().starts_with("script line 3:"));

        assert_eq!(parse("warp 9").unwrap_err().line, 1);
        assert!(parse("back now").unwrap_err().message.contains("no argument"));
        assert!(parse("set").is_err());
        assert!(parse("set max_gravity 2").is_err());
        assert!(parse("select").is_err());
    }

    #[test]
    fn names_resolve_against_the_dataset() {
        let dataset = Dataset::load([
            PlanetRecord::new("TOI-700 d").with(NumericField::DiscoveryYear, 2020.0),
            PlanetRecord::new("K2-18 b").with(NumericField::DiscoveryYear, 2015.0),
        ]);

        let NarrativeMsg::RecordSelected(Some(record)) =
            Step::Select("toi-700 d".into()).resolve(&dataset)
        else {
            panic!("expected a resolved record");
        };
        assert!(dataset.contains(&record));

        assert!(matches!(
            Step::Select("Tatooine".into()).resolve(&dataset),
            NarrativeMsg::RecordSelected(None)
        ));
        assert!(matches!(
            Step::Year(2015).resolve(&dataset),
            NarrativeMsg::YearSelected(2015)
        ));
    }
}
