use std::fmt;

use crate::parser::SyntaxError;

/// Most stages a pipeline may have.
pub const PIPE_MAX: usize = 8;
/// Most arguments a single command may carry.
pub const ARG_MAX: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    In,
    Out,
}

impl RedirectKind {
    pub fn symbol(self) -> char {
        match self {
            RedirectKind::In => '<',
            RedirectKind::Out => '>',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub kind: RedirectKind,
    pub file: String,
}

/// One stage of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
    /// `NAME=value` words written before the program.
    pub assignments: Vec<(String, String)>,
    pub redirect_in: Option<String>,
    pub redirect_out: Option<String>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Command {
            program: program.into(),
            ..Command::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn assign(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.assignments.push((name.into(), value.into()));
        self
    }

    pub fn redirect(mut self, kind: RedirectKind, file: impl Into<String>) -> Self {
        match kind {
            RedirectKind::In => self.redirect_in = Some(file.into()),
            RedirectKind::Out => self.redirect_out = Some(file.into()),
        }
        self
    }

    /// The first word becomes the program, the rest are arguments.
    pub fn push_word(&mut self, word: String) -> Result<(), SyntaxError> {
        if self.program.is_empty() {
            self.program = word;
        } else if self.args.len() >= ARG_MAX {
            return Err(SyntaxError::TooManyArguments { max: ARG_MAX });
        } else {
            self.args.push(word);
        }
        Ok(())
    }

    pub fn add_redirection(&mut self, redirection: Redirection) -> Result<(), SyntaxError> {
        let slot = match redirection.kind {
            RedirectKind::In => &mut self.redirect_in,
            RedirectKind::Out => &mut self.redirect_out,
        };
        if slot.is_some() {
            return Err(SyntaxError::DuplicateRedirection(redirection.kind));
        }
        *slot = Some(redirection.file);
        Ok(())
    }

    pub fn is_blank(&self) -> bool {
        self.program.is_empty()
            && self.args.is_empty()
            && self.assignments.is_empty()
            && self.redirect_in.is_none()
            && self.redirect_out.is_none()
    }

    pub fn is_assignment_only(&self) -> bool {
        self.program.is_empty()
            && self.args.is_empty()
            && !self.assignments.is_empty()
            && self.redirect_in.is_none()
            && self.redirect_out.is_none()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words: Vec<String> = self
            .assignments
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !self.program.is_empty() {
            words.push(self.program.clone());
        }
        words.extend(self.args.iter().cloned());
        if let Some(file) = &self.redirect_in {
            words.push(format!("< {}", file));
        }
        if let Some(file) = &self.redirect_out {
            words.push(format!("> {}", file));
        }
        write!(f, "{}", words.join(" "))
    }
}

/// The commands of one input line, connected left to right by pipes.
/// Never modified once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Command>,
}

impl Pipeline {
    /// Checks the stage limit and where redirections may appear: only the
    /// first stage may read from a file and only the last may write to one.
    pub fn new(stages: Vec<Command>) -> Result<Self, SyntaxError> {
        if stages.len() > PIPE_MAX {
            return Err(SyntaxError::TooManyStages { max: PIPE_MAX });
        }
        let last = stages.len().saturating_sub(1);
        for (i, stage) in stages.iter().enumerate() {
            if stage.program.is_empty() && !(stages.len() == 1 && stage.is_assignment_only()) {
                return Err(SyntaxError::EmptyCommand { stage: i });
            }
            if stage.args.len() > ARG_MAX {
                return Err(SyntaxError::TooManyArguments { max: ARG_MAX });
            }
            if i > 0 && stage.redirect_in.is_some() {
                return Err(SyntaxError::MisplacedRedirection {
                    kind: RedirectKind::In,
                    stage: i,
                });
            }
            if i < last && stage.redirect_out.is_some() {
                return Err(SyntaxError::MisplacedRedirection {
                    kind: RedirectKind::Out,
                    stage: i,
                });
            }
        }
        Ok(Pipeline { stages })
    }

    pub fn stages(&self) -> &[Command] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// A lone `NAME=value ...` line with nothing to run.
    pub fn is_assignment_only(&self) -> bool {
        matches!(self.stages.as_slice(), [only] if only.is_assignment_only())
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<String> = self.stages.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", stages.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_rejects_too_many_stages() {
        let stages = vec![Command::new("cat"); PIPE_MAX + 1];
        assert_eq!(
            Pipeline::new(stages),
            Err(SyntaxError::TooManyStages { max: PIPE_MAX })
        );
        assert_eq!(Pipeline::new(vec![Command::new("cat"); PIPE_MAX]).unwrap().len(), PIPE_MAX);
    }

    #[test]
    fn test_pipeline_redirection_positions() {
        let err = Pipeline::new(vec![
            Command::new("ls").redirect(RedirectKind::Out, "a"),
            Command::new("wc"),
        ]);
        assert_eq!(
            err,
            Err(SyntaxError::MisplacedRedirection {
                kind: RedirectKind::Out,
                stage: 0
            })
        );

        let err = Pipeline::new(vec![
            Command::new("ls"),
            Command::new("wc").redirect(RedirectKind::In, "a"),
        ]);
        assert_eq!(
            err,
            Err(SyntaxError::MisplacedRedirection {
                kind: RedirectKind::In,
                stage: 1
            })
        );

        assert!(
            Pipeline::new(vec![
                Command::new("cat").redirect(RedirectKind::In, "a"),
                Command::new("wc").redirect(RedirectKind::Out, "b"),
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_assignment_only_stage() {
        let assign = Command::default().assign("FOO", "bar");
        let pipeline = Pipeline::new(vec![assign.clone()]).unwrap();
        assert!(pipeline.is_assignment_only());

        assert_eq!(
            Pipeline::new(vec![Command::new("ls"), assign]),
            Err(SyntaxError::EmptyCommand { stage: 1 })
        );
    }

    #[test]
    fn test_duplicate_redirection() {
        let mut cmd = Command::new("cat");
        cmd.add_redirection(Redirection {
            kind: RedirectKind::In,
            file: "a".into(),
        })
        .unwrap();
        assert_eq!(
            cmd.add_redirection(Redirection {
                kind: RedirectKind::In,
                file: "b".into(),
            }),
            Err(SyntaxError::DuplicateRedirection(RedirectKind::In))
        );
        assert_eq!(cmd.redirect_in.as_deref(), Some("a"));
    }

    #[test]
    fn test_display() {
        let pipeline = Pipeline::new(vec![
            Command::new("ls").arg("-la").assign("LC_ALL", "C"),
            Command::new("grep").arg("foo").redirect(RedirectKind::Out, "out.txt"),
        ])
        .unwrap();
        assert_eq!(pipeline.to_string(), "LC_ALL=C ls -la | grep foo > out.txt");
    }
}
