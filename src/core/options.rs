//! Raw, unvalidated options as given on the command line.
//!
//! The same definition parses the user's invocation and the argument list
//! that container delegation hands to the in-container run.

use std::path::PathBuf;

use clap::{Args, Parser};

#[derive(Debug, Clone, Default, Args)]
pub struct RawOptions {
    /// Build with the Debug configuration
    #[arg(long)]
    pub debug: bool,

    /// Build with the RelWithDebInfo configuration
    #[arg(long)]
    pub relwithdebinfo: bool,

    /// Build with the RelMinSize configuration
    #[arg(long)]
    pub relminsize: bool,

    /// Build type by name (Release, Debug, RelWithDebInfo, RelMinSize)
    #[arg(long, value_name = "TYPE")]
    pub build_type: Option<String>,

    /// Increase log verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not write a log file into the source directory
    #[arg(long)]
    pub no_log_file: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Remove the build directory before configuring
    #[arg(long, overrides_with = "no_clean_before")]
    pub clean_before: bool,

    /// Keep the build directory before configuring, even if config says otherwise
    #[arg(long, overrides_with = "clean_before")]
    pub no_clean_before: bool,

    /// Remove the build directory after a successful build
    #[arg(long, overrides_with = "no_clean_after")]
    pub clean_after: bool,

    /// Keep the build directory after the build, even if config says otherwise
    #[arg(long, overrides_with = "clean_after")]
    pub no_clean_after: bool,

    /// Build incrementally instead of rebuilding everything
    #[arg(long, overrides_with = "rebuild")]
    pub incremental: bool,

    /// Rebuild everything, even if config asks for incremental builds
    #[arg(long, overrides_with = "incremental")]
    pub rebuild: bool,

    /// Build driver: "Visual Studio", "make", "ninja" or "nmake"
    #[arg(long, value_name = "TOOL")]
    pub build_tool: Option<String>,

    /// Source directory holding CMakeLists.txt (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Build directory (relative paths are taken from the source directory)
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Visual Studio version, as a year (2019) or version number (16)
    #[arg(long, value_name = "VER")]
    pub msvc_version: Option<String>,

    /// Run the build inside a container
    #[arg(long)]
    pub docker: bool,

    /// Container image used with --docker
    #[arg(long, value_name = "IMAGE")]
    pub docker_image: Option<String>,

    /// Mount point of the source directory inside the container
    #[arg(long, value_name = "PATH")]
    pub docker_mount: Option<String>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub print_plan: bool,

    /// Send console output other than errors to stdout
    ///
    /// Set on the in-container run so that only errors reach the stderr the
    /// delegating run judges.
    #[arg(long, hide = true)]
    pub console_stdout: bool,

    /// Targets to build
    #[arg(value_name = "TARGETS")]
    pub targets: Vec<String>,
}

#[derive(Parser)]
#[command(name = "cmbuild")]
struct OptionsParser {
    #[command(flatten)]
    options: RawOptions,
}

impl RawOptions {
    /// Parse options from an argument list that does not include the program name.
    pub fn try_parse_args<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let argv = std::iter::once(std::ffi::OsString::from("cmbuild"))
            .chain(args.into_iter().map(Into::into));
        OptionsParser::try_parse_from(argv).map(|p| p.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets_and_verbose() {
        let opts = RawOptions::try_parse_args(["install", "--verbose"]).unwrap();
        assert_eq!(opts.targets, vec!["install"]);
        assert!(opts.verbose);
        assert!(!opts.debug);
    }

    #[test]
    fn test_parse_conflicting_flags_is_not_a_parse_error() {
        let opts = RawOptions::try_parse_args(["--debug", "--relwithdebinfo"]).unwrap();
        assert!(opts.debug && opts.relwithdebinfo);
    }

    #[test]
    fn test_negated_switch_overrides_earlier_flag() {
        let opts = RawOptions::try_parse_args(["--clean-after", "--no-clean-after"]).unwrap();
        assert!(!opts.clean_after);
        assert!(opts.no_clean_after);

        let opts = RawOptions::try_parse_args(["--rebuild", "--incremental"]).unwrap();
        assert!(opts.incremental);
        assert!(!opts.rebuild);
    }

    #[test]
    fn test_parse_paths() {
        let opts =
            RawOptions::try_parse_args(["--source-dir", "/work/app", "--build-dir", "out"]).unwrap();
        assert_eq!(opts.source_dir, Some(PathBuf::from("/work/app")));
        assert_eq!(opts.build_dir, Some(PathBuf::from("out")));
    }
}
