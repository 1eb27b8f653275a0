use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` placeholders in raw configuration text
///
/// `{{ env.VAR | default("fallback") }}` substitutes the fallback when the
/// variable is unset. Comment lines are copied through untouched so a
/// commented-out secret never has to exist in the environment.
pub fn expand_env(input: &str) -> Result<String, String> {
    let expanded = input
        .split('\n')
        .map(expand_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expanded.join("\n"))
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 1: scoped key (`env.NAME`), 2: optional default inside default("...")
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

fn expand_line(line: &str) -> Result<String, String> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_owned());
    }

    let mut failure = None;

    let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
        let key = &captures[1];
        let fallback = captures.get(2).map(|m| m.as_str());

        match resolve(key, fallback) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[server]\nlisten_address = \"127.0.0.1:3000\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn identity_key_comes_from_environment() {
        temp_env::with_var("VOXFORM_TEST_FIREBASE_KEY", Some("fb-key"), || {
            let result = expand_env("api_key = \"{{ env.VOXFORM_TEST_FIREBASE_KEY }}\"").unwrap();
            assert_eq!(result, "api_key = \"fb-key\"");
        });
    }

    #[test]
    fn several_placeholders_on_separate_lines() {
        let vars = [("VOXFORM_TEST_A", Some("a")), ("VOXFORM_TEST_B", Some("b"))];
        temp_env::with_vars(vars, || {
            let result = expand_env("x = \"{{ env.VOXFORM_TEST_A }}\"\ny = \"{{env.VOXFORM_TEST_B}}\"").unwrap();
            assert_eq!(result, "x = \"a\"\ny = \"b\"");
        });
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        temp_env::with_var_unset("VOXFORM_TEST_MISSING", || {
            let err = expand_env("api_key = \"{{ env.VOXFORM_TEST_MISSING }}\"").unwrap_err();
            assert!(err.contains("VOXFORM_TEST_MISSING"));
        });
    }

    #[test]
    fn only_env_scope_is_supported() {
        let err = expand_env("api_key = \"{{ vault.KEY }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comments_are_not_expanded() {
        temp_env::with_var_unset("VOXFORM_TEST_MISSING", || {
            let input = "  # api_key = \"{{ env.VOXFORM_TEST_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("VOXFORM_TEST_OPTIONAL", || {
            let result = expand_env("v = \"{{ env.VOXFORM_TEST_OPTIONAL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "v = \"fallback\"");
        });

        temp_env::with_var("VOXFORM_TEST_OPTIONAL", Some("set"), || {
            let result = expand_env("v = \"{{ env.VOXFORM_TEST_OPTIONAL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "v = \"set\"");
        });
    }
}
