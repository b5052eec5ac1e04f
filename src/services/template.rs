//! Action parameter templates
//!
//! Parameters may reference attributes as `{{ name }}`; `{{ HOSTNAME }}` is
//! always bound to the evaluated host's name.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::config::TemplateMode;
use crate::models::{value_to_string, AttributeBag};
use crate::utils::{AppError, AppResult};

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*\}\}").unwrap()
});

/// Renders action parameters against a host's attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResolver {
    mode: TemplateMode,
}

impl TemplateResolver {
    pub fn new(mode: TemplateMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TemplateMode {
        self.mode
    }

    /// Render `template` with `HOSTNAME` and every attribute of `bag` bound
    ///
    /// In nullify mode unknown names render as an empty string; in strict
    /// mode they are an error.
    pub fn render(&self, template: &str, hostname: &str, bag: &AttributeBag) -> AppResult<String> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }

        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;
        for caps in PLACEHOLDER_REGEX.captures_iter(template) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            rendered.push_str(&template[last..whole.start]);
            rendered.push_str(&self.lookup(&caps, hostname, bag)?);
            last = whole.end;
        }
        rendered.push_str(&template[last..]);

        Ok(rendered)
    }

    fn lookup(&self, caps: &Captures, hostname: &str, bag: &AttributeBag) -> AppResult<String> {
        let name = &caps[1];
        if name == "HOSTNAME" {
            return Ok(hostname.to_string());
        }

        match bag.get(name) {
            Some(value) => Ok(value_to_string(value)),
            None => match self.mode {
                TemplateMode::Nullify => {
                    debug!("Template variable '{}' undefined, rendered empty", name);
                    Ok(String::new())
                }
                TemplateMode::Strict => Err(AppError::bad_request(format!(
                    "Undefined template variable '{}'",
                    name
                ))),
            },
        }
    }
}
