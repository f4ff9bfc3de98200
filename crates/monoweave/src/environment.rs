use std::fmt;
use std::io::IsTerminal;

const NO_TTY_VAR: &str = "MONOWEAVE_NO_TTY";
const FORCE_TTY_VAR: &str = "MONOWEAVE_FORCE_TTY";

const CI_ENV_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonInteractiveReason {
    ExplicitDisable,
    CiDetected { env_var: String },
    NoTerminal,
}

impl fmt::Display for NonInteractiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitDisable => write!(f, "{NO_TTY_VAR} is set"),
            Self::CiDetected { env_var } => write!(f, "CI detected via {env_var}"),
            Self::NoTerminal => f.write_str("stdin is not a terminal"),
        }
    }
}

/// Why the `version` command must not prompt, if it must not.
pub fn non_interactive_reason() -> Option<NonInteractiveReason> {
    if std::env::var_os(NO_TTY_VAR).is_some() {
        return Some(NonInteractiveReason::ExplicitDisable);
    }
    if std::env::var_os(FORCE_TTY_VAR).is_some() {
        return None;
    }
    if let Some(env_var) = detect_ci_env_var() {
        return Some(NonInteractiveReason::CiDetected { env_var });
    }
    if !std::io::stdin().is_terminal() {
        return Some(NonInteractiveReason::NoTerminal);
    }
    None
}

fn detect_ci_env_var() -> Option<String> {
    CI_ENV_VARS
        .iter()
        .find(|var| std::env::var_os(var).is_some())
        .map(|var| (*var).to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_MUTEX.lock().expect("mutex poisoned");

        let watched: Vec<&str> = CI_ENV_VARS
            .iter()
            .copied()
            .chain([NO_TTY_VAR, FORCE_TTY_VAR])
            .collect();
        let saved: Vec<(&str, Option<String>)> = watched
            .iter()
            .map(|var| (*var, std::env::var(var).ok()))
            .collect();

        for var in &watched {
            // SAFETY: env access is serialised by ENV_MUTEX.
            unsafe { std::env::remove_var(var) };
        }
        for (key, value) in vars {
            // SAFETY: env access is serialised by ENV_MUTEX.
            unsafe { std::env::set_var(key, value) };
        }

        let result = f();

        for (key, value) in saved {
            match value {
                // SAFETY: env access is serialised by ENV_MUTEX.
                Some(v) => unsafe { std::env::set_var(key, v) },
                // SAFETY: env access is serialised by ENV_MUTEX.
                None => unsafe { std::env::remove_var(key) },
            }
        }
        result
    }

    #[test]
    fn no_ci_vars_means_no_ci() {
        with_env(&[], || assert!(detect_ci_env_var().is_none()));
    }

    #[test]
    fn github_actions_is_ci() {
        with_env(&[("GITHUB_ACTIONS", "true")], || {
            assert_eq!(
                non_interactive_reason(),
                Some(NonInteractiveReason::CiDetected {
                    env_var: "GITHUB_ACTIONS".to_string()
                })
            );
        });
    }

    #[test]
    fn explicit_disable_wins_over_force() {
        with_env(&[(NO_TTY_VAR, "1"), (FORCE_TTY_VAR, "1")], || {
            assert_eq!(
                non_interactive_reason(),
                Some(NonInteractiveReason::ExplicitDisable)
            );
        });
    }

    #[test]
    fn force_tty_overrides_ci() {
        with_env(&[("CI", "true"), (FORCE_TTY_VAR, "1")], || {
            assert!(non_interactive_reason().is_none());
        });
    }
}
