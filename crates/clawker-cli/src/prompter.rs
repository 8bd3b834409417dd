//! Interactive prompting with non-interactive defaults.
//!
//! Every prompt is answerable without a terminal: when prompting is not
//! possible (piped stdin/stdout or `--yes`) the default answer is returned
//! without touching stdin. A required question with no default is the one
//! case that errors instead.

use crate::iostreams::IoStreams;
use std::sync::Arc;
use thiserror::Error;

/// Prompting failures.
#[derive(Debug, Error)]
pub enum PromptError {
    /// A required answer with no default in a non-interactive session.
    #[error("cannot prompt for '{message}' in a non-interactive session")]
    NonInteractive {
        /// The question that could not be asked.
        message: String,
    },
    /// Stdin closed mid-prompt.
    #[error("input closed while waiting for '{message}'")]
    Eof {
        /// The question being asked.
        message: String,
    },
    /// A validator rejected a free-form answer.
    #[error("{reason}")]
    InvalidInput {
        /// The validator's rejection message.
        reason: String,
    },
    /// A numbered choice was not one of the options.
    #[error("invalid selection: '{answer}'")]
    InvalidSelection {
        /// What was typed.
        answer: String,
    },
    /// Underlying stream failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Validator applied to free-form input before it is accepted.
pub type Validator = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// A free-form input question.
pub struct InputOptions {
    /// The question text, without punctuation.
    pub message: String,
    /// Answer used on empty input and in non-interactive sessions.
    pub default: Option<String>,
    /// Whether an empty answer is rejected.
    pub required: bool,
    /// Optional acceptance check; a rejected answer fails the prompt.
    pub validator: Option<Validator>,
}

impl InputOptions {
    /// A plain optional question.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            required: false,
            validator: None,
        }
    }

    /// Set the default answer.
    #[must_use]
    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Require a non-empty answer.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a validator.
    #[must_use]
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Asks questions through an [`IoStreams`].
pub struct Prompter {
    ios: Arc<IoStreams>,
}

impl Prompter {
    /// A prompter over the given streams.
    pub fn new(ios: Arc<IoStreams>) -> Self {
        Self { ios }
    }

    fn ask(&self, rendered: &str) -> Result<Option<String>, PromptError> {
        self.ios.err().write_str(rendered)?;
        Ok(self.ios.input().read_line()?)
    }

    /// Ask a free-form question.
    ///
    /// # Errors
    ///
    /// [`PromptError::NonInteractive`] when the session cannot prompt and
    /// the question is required without a default; [`PromptError::Eof`]
    /// when stdin closes before an acceptable answer arrives;
    /// [`PromptError::InvalidInput`] when the validator rejects the answer.
    pub fn input(&self, opts: &InputOptions) -> Result<String, PromptError> {
        if !self.ios.can_prompt() {
            return match &opts.default {
                Some(default) => Ok(default.clone()),
                None if opts.required => Err(PromptError::NonInteractive {
                    message: opts.message.clone(),
                }),
                None => Ok(String::new()),
            };
        }

        let scheme = self.ios.color_scheme();
        loop {
            let hint = match &opts.default {
                Some(default) => format!(" [{default}]"),
                None => String::new(),
            };
            let rendered = format!("{} {}{hint}: ", scheme.accent("?"), opts.message);
            let Some(line) = self.ask(&rendered)? else {
                return match &opts.default {
                    Some(default) => Ok(default.clone()),
                    None => Err(PromptError::Eof {
                        message: opts.message.clone(),
                    }),
                };
            };
            let answer = if line.is_empty() {
                opts.default.clone().unwrap_or_default()
            } else {
                line
            };
            if answer.is_empty() && opts.required {
                self.ios.print_warning("A value is required.");
                continue;
            }
            if let Some(validator) = &opts.validator
                && let Err(reason) = validator(&answer)
            {
                return Err(PromptError::InvalidInput { reason });
            }
            return Ok(answer);
        }
    }

    /// Ask a yes/no question; returns `default_yes` without prompting in
    /// non-interactive sessions.
    ///
    /// # Errors
    ///
    /// Propagates stream failures.
    pub fn confirm(&self, message: &str, default_yes: bool) -> Result<bool, PromptError> {
        if !self.ios.can_prompt() {
            return Ok(default_yes);
        }

        let scheme = self.ios.color_scheme();
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        loop {
            let rendered = format!("{} {message} {hint} ", scheme.accent("?"));
            let Some(line) = self.ask(&rendered)? else {
                return Ok(default_yes);
            };
            match line.trim().to_lowercase().as_str() {
                "" => return Ok(default_yes),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.ios.print_warning("Please answer y or n."),
            }
        }
    }

    /// Pick one of `options` by number; returns `default_idx` without
    /// prompting in non-interactive sessions. An empty answer (or EOF)
    /// accepts the default; anything that is not a listed number is
    /// [`PromptError::InvalidSelection`].
    ///
    /// # Errors
    ///
    /// [`PromptError::InvalidSelection`] on an answer that is not one of
    /// the numbered options; propagates stream failures.
    ///
    /// # Panics
    ///
    /// Panics if `options` is empty or `default_idx` is out of range.
    pub fn select(
        &self,
        message: &str,
        options: &[&str],
        default_idx: usize,
    ) -> Result<usize, PromptError> {
        assert!(!options.is_empty(), "select needs at least one option");
        assert!(default_idx < options.len(), "default option out of range");
        if !self.ios.can_prompt() {
            return Ok(default_idx);
        }

        let scheme = self.ios.color_scheme();
        let _ = self
            .ios
            .err()
            .write_line(&format!("{} {message}", scheme.accent("?")));
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default_idx { ">" } else { " " };
            let _ = self
                .ios
                .err()
                .write_line(&format!("  {marker} {}. {option}", i + 1));
        }
        let rendered = format!("Choice [{}]: ", default_idx + 1);
        let Some(line) = self.ask(&rendered)? else {
            return Ok(default_idx);
        };
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default_idx);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => Ok(n - 1),
            _ => Err(PromptError::InvalidSelection {
                answer: answer.to_string(),
            }),
        }
    }
}
