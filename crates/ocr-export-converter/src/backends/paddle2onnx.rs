//! Conversion through the `paddle2onnx` command line tool.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use ocr_export_types::{ConversionConfig, SourceModelHandle};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{ConversionError, GraphConverter, SUPPORTED_OPSETS};

const DEFAULT_PROGRAM: &str = "paddle2onnx";
const OUTPUT_FILENAME: &str = "model.onnx";
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paddle2OnnxConfig {
    pub program: PathBuf,
    /// Arguments placed before the converter flags, e.g. a launcher script.
    pub launcher_args: Vec<String>,
}

impl Default for Paddle2OnnxConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            launcher_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paddle2OnnxConverter {
    program: PathBuf,
    launcher_args: Vec<String>,
}

impl Paddle2OnnxConverter {
    pub fn new() -> Self {
        let config = Paddle2OnnxConfig::default();
        Self {
            program: config.program,
            launcher_args: config.launcher_args,
        }
    }

    pub fn with_config(config: Paddle2OnnxConfig) -> Result<Self, ConversionError> {
        if config.program.as_os_str().is_empty() {
            return Err(ConversionError::EmptyProgram);
        }
        Ok(Self {
            program: config.program,
            launcher_args: config.launcher_args,
        })
    }

    fn program_label(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for Paddle2OnnxConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphConverter for Paddle2OnnxConverter {
    fn name(&self) -> &'static str {
        "paddle2onnx"
    }

    async fn convert(
        &self,
        handle: &SourceModelHandle,
        config: &ConversionConfig,
    ) -> Result<Vec<u8>, ConversionError> {
        if !SUPPORTED_OPSETS.contains(&config.opset_version) {
            return Err(ConversionError::UnsupportedOpset(config.opset_version));
        }

        let scratch = tempfile::Builder::new()
            .prefix("ocr-export-")
            .tempdir()
            .map_err(|source| ConversionError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let save_file = scratch.path().join(OUTPUT_FILENAME);
        let args = command_args(handle, config, &save_file);
        let program = self.program_label();

        debug!(
            %program,
            role = %handle.role(),
            model_dir = %handle.model_dir().display(),
            opset = config.opset_version,
            "running converter"
        );

        let output = Command::new(&self.program)
            .args(&self.launcher_args)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConversionError::Launch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConversionError::Failed {
                program,
                role: handle.role(),
                status: output.status.to_string(),
                stderr: tail_lines(&output.stderr, STDERR_TAIL_LINES),
            });
        }

        let bytes = match fs::read(&save_file).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    %program,
                    stdout = %tail_lines(&output.stdout, STDERR_TAIL_LINES),
                    "converter exited cleanly without writing a graph"
                );
                return Err(ConversionError::MissingOutput {
                    program,
                    role: handle.role(),
                });
            }
            Err(source) => {
                return Err(ConversionError::Io {
                    path: save_file,
                    source,
                });
            }
        };

        if bytes.is_empty() {
            return Err(ConversionError::EmptyOutput {
                program,
                role: handle.role(),
            });
        }

        debug!(role = %handle.role(), bytes = bytes.len(), "converter finished");
        Ok(bytes)
    }
}

fn command_args(
    handle: &SourceModelHandle,
    config: &ConversionConfig,
    save_file: &Path,
) -> Vec<OsString> {
    let file_name = |path: &Path| {
        path.file_name()
            .map(OsString::from)
            .unwrap_or_else(|| path.as_os_str().to_os_string())
    };

    vec![
        "--model_dir".into(),
        handle.model_dir().as_os_str().to_os_string(),
        "--model_filename".into(),
        file_name(handle.topology_path()),
        "--params_filename".into(),
        file_name(handle.weights_path()),
        "--save_file".into(),
        save_file.as_os_str().to_os_string(),
        "--opset_version".into(),
        config.opset_version.to_string().into(),
        "--enable_onnx_checker".into(),
        python_bool(config.run_checker).into(),
        "--enable_auto_update_opset".into(),
        python_bool(config.auto_upgrade_opset).into(),
    ]
}

fn python_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn tail_lines(bytes: &[u8], count: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocr_export_types::ModelRole;
    use tempfile::tempdir;

    fn handle(dir: &Path) -> SourceModelHandle {
        SourceModelHandle::new(
            ModelRole::Detection,
            dir.to_path_buf(),
            dir.join("inference.pdmodel"),
            dir.join("inference.pdiparams"),
            "ch_PP-OCRv4_det_infer".to_string(),
        )
    }

    #[test]
    fn command_args_carry_fixed_configuration() {
        let dir = PathBuf::from("/models/ch_PP-OCRv4_det_infer");
        let args = command_args(
            &handle(&dir),
            &ConversionConfig::DEFAULT,
            Path::new("/tmp/out.onnx"),
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "--model_dir",
                "/models/ch_PP-OCRv4_det_infer",
                "--model_filename",
                "inference.pdmodel",
                "--params_filename",
                "inference.pdiparams",
                "--save_file",
                "/tmp/out.onnx",
                "--opset_version",
                "13",
                "--enable_onnx_checker",
                "True",
                "--enable_auto_update_opset",
                "True",
            ]
        );
    }

    #[test]
    fn tail_lines_keeps_last_non_empty_lines() {
        let text = b"one\n\ntwo\nthree  \n";
        assert_eq!(tail_lines(text, 2), "two\nthree");
        assert_eq!(tail_lines(b"", 5), "");
    }

    #[test]
    fn empty_program_is_rejected() {
        let err = Paddle2OnnxConverter::with_config(Paddle2OnnxConfig {
            program: PathBuf::new(),
            launcher_args: Vec::new(),
        })
        .unwrap_err();
        assert!(matches!(err, ConversionError::EmptyProgram));
    }

    #[tokio::test]
    async fn unsupported_opset_fails_before_launch() {
        let dir = tempdir().unwrap();
        let config = ConversionConfig {
            opset_version: 42,
            ..ConversionConfig::DEFAULT
        };
        let err = Paddle2OnnxConverter::new()
            .convert(&handle(dir.path()), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedOpset(42)));
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let dir = tempdir().unwrap();
        let converter = Paddle2OnnxConverter::with_config(Paddle2OnnxConfig {
            program: dir.path().join("no-such-paddle2onnx"),
            launcher_args: Vec::new(),
        })
        .unwrap();
        let err = converter
            .convert(&handle(dir.path()), &ConversionConfig::DEFAULT)
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::Launch { .. }));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;

        const WRITES_GRAPH: &str = r#"
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
out=""
while [ "$#" -gt 0 ]; do
  case "$1" in
    --save_file) out="$2"; shift ;;
  esac
  shift
done
printf 'graph-bytes' > "$out"
"#;

        const FAILS: &str = r#"
echo "loading model" >&2
echo "Operator deformable_conv is not supported" >&2
exit 3
"#;

        const WRITES_NOTHING: &str = "echo done\n";

        fn scripted_converter(dir: &Path, script: &str) -> Paddle2OnnxConverter {
            let script_path = dir.join("fake-paddle2onnx.sh");
            std::fs::write(&script_path, script).unwrap();
            Paddle2OnnxConverter::with_config(Paddle2OnnxConfig {
                program: PathBuf::from("sh"),
                launcher_args: vec![script_path.display().to_string()],
            })
            .unwrap()
        }

        #[tokio::test]
        async fn converter_output_is_read_back() {
            let dir = tempdir().unwrap();
            let converter = scripted_converter(dir.path(), WRITES_GRAPH);
            let bytes = converter
                .convert(&handle(dir.path()), &ConversionConfig::DEFAULT)
                .await
                .unwrap();
            assert_eq!(bytes, b"graph-bytes");

            let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
            assert!(args.contains("--opset_version\n13\n"));
            assert!(args.contains("--enable_auto_update_opset\nTrue\n"));
        }

        #[tokio::test]
        async fn failing_converter_reports_stderr() {
            let dir = tempdir().unwrap();
            let converter = scripted_converter(dir.path(), FAILS);
            let err = converter
                .convert(&handle(dir.path()), &ConversionConfig::DEFAULT)
                .await
                .unwrap_err();
            match err {
                ConversionError::Failed { role, stderr, .. } => {
                    assert_eq!(role, ModelRole::Detection);
                    assert!(stderr.contains("deformable_conv"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn silent_converter_is_missing_output() {
            let dir = tempdir().unwrap();
            let converter = scripted_converter(dir.path(), WRITES_NOTHING);
            let err = converter
                .convert(&handle(dir.path()), &ConversionConfig::DEFAULT)
                .await
                .unwrap_err();
            assert!(matches!(err, ConversionError::MissingOutput { .. }));
        }
    }
}
