//! Target resolution: which solution or project files the driver builds.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::{BuildError, BuildPlan, Platform, SolutionCandidate};
use crate::util::fs::top_level_files;
use crate::util::shell::{Shell, Status};

pub const SOLUTION_EXTENSION: &str = "sln";

/// Per-target project file extensions, in lookup order.
pub const PROJECT_EXTENSIONS: &[&str] = &["vcproj", "vcxproj"];

/// Target name that selects the ambient solution.
pub const DEFAULT_TARGET: &str = "all";

static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)PROJECT_NAME = (\w+)[ \t]*$").unwrap());

/// Outcome of looking for the build tree's own solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultSolution {
    Found(PathBuf),
    /// Several candidates; none is picked.
    Ambiguous(Vec<String>),
    Missing,
}

impl DefaultSolution {
    fn require(self, build_dir: &Path) -> Result<PathBuf, BuildError> {
        match self {
            DefaultSolution::Found(path) => Ok(path),
            DefaultSolution::Ambiguous(candidates) => {
                Err(BuildError::AmbiguousSolution { candidates })
            }
            DefaultSolution::Missing => Err(BuildError::SolutionNotFound {
                build_dir: build_dir.to_path_buf(),
            }),
        }
    }
}

/// Decide the units the build stage invokes the driver on.
pub fn resolve_targets(
    plan: &BuildPlan,
    configure_output: &str,
    shell: &Shell,
) -> Result<Vec<SolutionCandidate>> {
    match plan.platform {
        Platform::Linux => Ok(vec![SolutionCandidate::Targets(plan.targets.clone())]),
        Platform::Windows => resolve_windows(plan, configure_output, shell),
    }
}

fn resolve_windows(
    plan: &BuildPlan,
    configure_output: &str,
    shell: &Shell,
) -> Result<Vec<SolutionCandidate>> {
    let build_dir = &plan.build_dir;
    let files = top_level_files(build_dir)?;
    let default = find_default_solution(&files, build_dir, configure_output, shell);
    if default == DefaultSolution::Missing {
        return Err(BuildError::SolutionNotFound {
            build_dir: build_dir.clone(),
        }
        .into());
    }

    if plan.targets.is_empty() {
        let solution = default.require(build_dir)?;
        return Ok(vec![SolutionCandidate::Solution(solution)]);
    }

    let targets: Vec<String> = plan.targets.iter().map(|t| t.to_lowercase()).collect();
    let mut resolved = Vec::new();

    if targets.iter().any(|t| t == DEFAULT_TARGET) {
        resolved.push(SolutionCandidate::Solution(default.require(build_dir)?));
    }

    for target in targets.iter().filter(|t| *t != DEFAULT_TARGET) {
        match find_project(&files, target) {
            Some(project) => {
                shell.status(Status::Located, project.display());
                resolved.push(SolutionCandidate::Project(project));
            }
            None => {
                return Err(BuildError::TargetNotFound {
                    target: target.clone(),
                    build_dir: build_dir.clone(),
                }
                .into())
            }
        }
    }

    Ok(resolved)
}

/// Find the ambient solution by directory scan, then by configure log.
///
/// The log is only consulted when the scan finds nothing; several
/// solutions on disk leave no usable default.
pub fn find_default_solution(
    files: &[PathBuf],
    build_dir: &Path,
    configure_output: &str,
    shell: &Shell,
) -> DefaultSolution {
    let solutions: Vec<&PathBuf> = files
        .iter()
        .filter(|p| has_extension(p, SOLUTION_EXTENSION))
        .collect();

    match solutions.as_slice() {
        [only] => {
            shell.status(Status::Located, format!("solution {}", only.display()));
            return DefaultSolution::Found((*only).clone());
        }
        [] => {}
        many => {
            shell.warn("multiple *.sln files located, none used as default");
            let names: Vec<String> = many.iter().map(|p| file_name(p)).collect();
            for name in &names {
                shell.note(format!("    {}", name));
            }
            return DefaultSolution::Ambiguous(names);
        }
    }

    shell.warn("trying to match PROJECT_NAME in cmake log");
    let names: Vec<&str> = PROJECT_NAME
        .captures_iter(configure_output)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    match names.as_slice() {
        [name] => {
            let path = build_dir.join(format!("{}.{}", name, SOLUTION_EXTENSION));
            shell.status(Status::Located, format!("solution {}", path.display()));
            DefaultSolution::Found(path)
        }
        _ => DefaultSolution::Missing,
    }
}

/// Case-insensitive lookup of `<target>.<ext>` for each project extension.
fn find_project(files: &[PathBuf], target: &str) -> Option<PathBuf> {
    PROJECT_EXTENSIONS.iter().find_map(|ext| {
        let wanted = format!("{}.{}", target, ext);
        files
            .iter()
            .find(|p| file_name(p).to_lowercase() == wanted)
            .cloned()
    })
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{build_error, BuildTool};
    use crate::test_support::fixtures::plan_in;
    use crate::util::shell::Verbosity;
    use std::fs;
    use tempfile::TempDir;

    fn shell() -> Shell {
        Shell::new(Verbosity::Normal, true)
    }

    fn windows_plan(tmp: &TempDir, targets: &[&str]) -> BuildPlan {
        let mut plan = plan_in(tmp.path(), Platform::Windows, BuildTool::VisualStudio);
        plan.targets = targets.iter().map(|t| t.to_string()).collect();
        fs::create_dir_all(&plan.build_dir).unwrap();
        plan
    }

    fn touch(plan: &BuildPlan, name: &str) -> PathBuf {
        let path = plan.build_dir.join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_single_solution_is_selected() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &[]);
        let sln = touch(&plan, "demo.sln");
        touch(&plan, "ALL_BUILD.vcxproj");

        let resolved = resolve_targets(&plan, "", &shell()).unwrap();
        assert_eq!(resolved, vec![SolutionCandidate::Solution(sln)]);
    }

    #[test]
    fn test_two_solutions_without_targets_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &[]);
        touch(&plan, "a.sln");
        touch(&plan, "b.sln");

        let err = resolve_targets(&plan, "PROJECT_NAME = a\n", &shell()).unwrap_err();
        match build_error(&err) {
            Some(BuildError::AmbiguousSolution { candidates }) => {
                assert_eq!(candidates, &vec!["a.sln".to_string(), "b.sln".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_two_solutions_with_explicit_project_targets() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &["Core"]);
        touch(&plan, "a.sln");
        touch(&plan, "b.sln");
        let core = touch(&plan, "core.vcxproj");

        let resolved = resolve_targets(&plan, "", &shell()).unwrap();
        assert_eq!(resolved, vec![SolutionCandidate::Project(core)]);
    }

    #[test]
    fn test_log_fallback_synthesizes_solution_name() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &[]);

        let resolved =
            resolve_targets(&plan, "-- project_name = demo\n-- Configuring done\n", &shell())
                .unwrap();
        assert_eq!(
            resolved,
            vec![SolutionCandidate::Solution(plan.build_dir.join("demo.sln"))]
        );
    }

    #[test]
    fn test_no_solution_anywhere() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &[]);

        let err = resolve_targets(&plan, "-- Configuring done\n", &shell()).unwrap_err();
        assert!(matches!(
            build_error(&err),
            Some(BuildError::SolutionNotFound { .. })
        ));
    }

    #[test]
    fn test_explicit_targets_still_need_a_solution() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &["core"]);
        touch(&plan, "core.vcxproj");

        let err = resolve_targets(&plan, "-- Configuring done\n", &shell()).unwrap_err();
        assert!(matches!(
            build_error(&err),
            Some(BuildError::SolutionNotFound { .. })
        ));
    }

    #[test]
    fn test_explicit_target_with_solution_from_log() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &["core"]);
        let core = touch(&plan, "core.vcxproj");

        let resolved = resolve_targets(&plan, "-- PROJECT_NAME = demo\n", &shell()).unwrap();
        assert_eq!(resolved, vec![SolutionCandidate::Project(core)]);
    }

    #[test]
    fn test_all_adds_solution_before_projects() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &["tests", "ALL"]);
        let sln = touch(&plan, "demo.sln");
        let tests = touch(&plan, "Tests.vcxproj");

        let resolved = resolve_targets(&plan, "", &shell()).unwrap();
        assert_eq!(
            resolved,
            vec![
                SolutionCandidate::Solution(sln),
                SolutionCandidate::Project(tests)
            ]
        );
    }

    #[test]
    fn test_vcproj_takes_priority_over_vcxproj() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &["lib"]);
        touch(&plan, "demo.sln");
        let old = touch(&plan, "lib.vcproj");
        touch(&plan, "lib.vcxproj");

        let resolved = resolve_targets(&plan, "", &shell()).unwrap();
        assert_eq!(resolved, vec![SolutionCandidate::Project(old)]);
    }

    #[test]
    fn test_missing_target_is_named() {
        let tmp = TempDir::new().unwrap();
        let plan = windows_plan(&tmp, &["ghost"]);
        touch(&plan, "demo.sln");

        let err = resolve_targets(&plan, "", &shell()).unwrap_err();
        match build_error(&err) {
            Some(BuildError::TargetNotFound { target, .. }) => assert_eq!(target, "ghost"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_linux_targets_pass_through() {
        let tmp = TempDir::new().unwrap();
        let mut plan = plan_in(tmp.path(), Platform::Linux, BuildTool::Make);
        plan.targets = vec!["all".into(), "Install".into()];

        let resolved = resolve_targets(&plan, "", &shell()).unwrap();
        assert_eq!(
            resolved,
            vec![SolutionCandidate::Targets(vec!["all".into(), "Install".into()])]
        );
    }
}
