//! Provider backed by the on-disk PaddleOCR model cache.
//!
//! PaddleOCR unpacks its inference models under
//! `<cache>/<det|rec>/<lang>/<model name>/`. Populating the cache is the job of
//! PaddleOCR itself; this provider only reads it. Character dictionaries are
//! not part of the model tarballs: they ship inside the installed `paddleocr`
//! Python package under `ppocr/utils/`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use ocr_export_types::{ModelIdentity, ModelRole};
use tracing::debug;

use crate::catalog::{self, PipelineEntry};
use crate::{ModelProvider, ProviderError, Vocabulary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddleCacheConfig {
    pub cache_dir: PathBuf,
    /// Explicit dictionary file; skips the search below when set.
    pub dictionary: Option<PathBuf>,
    /// Extra directories searched for `<dictionary>.txt`.
    pub dictionary_dirs: Vec<PathBuf>,
    /// Python installation prefixes scanned for the `paddleocr` package.
    pub python_prefixes: Vec<PathBuf>,
}

impl PaddleCacheConfig {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            dictionary: None,
            dictionary_dirs: Vec::new(),
            python_prefixes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaddleCacheProvider {
    config: PaddleCacheConfig,
}

impl PaddleCacheProvider {
    pub fn new(config: PaddleCacheConfig) -> Self {
        Self { config }
    }

    /// `~/.paddleocr/whl`, where PaddleOCR keeps downloaded inference models.
    pub fn default_cache_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(".paddleocr").join("whl"))
    }

    /// Active virtualenv or conda env, the user site, then system prefixes.
    pub fn default_python_prefixes() -> Vec<PathBuf> {
        let mut prefixes: Vec<PathBuf> = ["VIRTUAL_ENV", "CONDA_PREFIX"]
            .iter()
            .filter_map(|var| env::var_os(var))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .collect();
        if let Some(dirs) = BaseDirs::new() {
            prefixes.push(dirs.home_dir().join(".local"));
        }
        prefixes.push(PathBuf::from("/usr/local"));
        prefixes.push(PathBuf::from("/usr"));
        prefixes
    }

    fn entry(&self, identity: &ModelIdentity) -> Result<&'static PipelineEntry, ProviderError> {
        if identity.use_gpu() {
            return Err(ProviderError::AcceleratorUnsupported);
        }
        catalog::lookup(identity.language())
            .ok_or_else(|| ProviderError::UnknownLanguage(identity.language().to_string()))
    }

    fn role_dir(&self, entry: &PipelineEntry, role: ModelRole) -> PathBuf {
        self.config
            .cache_dir
            .join(role.as_str())
            .join(entry.language)
            .join(entry.model_name(role))
    }

    fn dictionary_candidates(&self, entry: &PipelineEntry) -> Vec<PathBuf> {
        let file_name = format!("{}.txt", entry.dictionary);
        let mut candidates = vec![
            self.role_dir(entry, ModelRole::Recognition).join(&file_name),
            self.config.cache_dir.join(&file_name),
        ];
        candidates.extend(
            self.config
                .dictionary_dirs
                .iter()
                .map(|dir| dir.join(&file_name)),
        );
        for prefix in &self.config.python_prefixes {
            for utils in package_utils_dirs(prefix) {
                candidates.push(utils.join(&file_name));
                candidates.push(utils.join("dict").join(&file_name));
            }
        }
        candidates
    }
}

impl ModelProvider for PaddleCacheProvider {
    fn name(&self) -> &'static str {
        "paddleocr-cache"
    }

    fn model_dir(
        &self,
        identity: &ModelIdentity,
        role: ModelRole,
    ) -> Result<PathBuf, ProviderError> {
        let entry = self.entry(identity)?;
        let dir = self.role_dir(entry, role);
        debug!(%role, dir = %dir.display(), "looking up cached model");
        if !dir.is_dir() {
            return Err(ProviderError::MissingModelDir { role, path: dir });
        }
        Ok(dir)
    }

    fn vocabulary(&self, identity: &ModelIdentity) -> Result<Vocabulary, ProviderError> {
        let entry = self.entry(identity)?;

        let path = match &self.config.dictionary {
            Some(path) if path.is_file() => path.clone(),
            Some(path) => {
                return Err(ProviderError::MissingVocabulary {
                    name: entry.dictionary.to_string(),
                    searched: path.display().to_string(),
                });
            }
            None => {
                let candidates = self.dictionary_candidates(entry);
                match candidates.iter().find(|path| path.is_file()) {
                    Some(path) => path.clone(),
                    None => {
                        return Err(ProviderError::MissingVocabulary {
                            name: entry.dictionary.to_string(),
                            searched: join_paths(&candidates),
                        });
                    }
                }
            }
        };

        debug!(path = %path.display(), "reading vocabulary");
        let symbols = read_dictionary(&path)?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(entry.dictionary)
            .to_string();
        Ok(Vocabulary { name, symbols })
    }
}

/// Every line is a symbol; blank lines are kept so class indices stay aligned.
fn read_dictionary(path: &Path) -> Result<Vec<String>, ProviderError> {
    let contents = fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
    Ok(contents
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect())
}

/// `paddleocr/ppocr/utils` under every site directory of `prefix`, newest
/// interpreter first.
fn package_utils_dirs(prefix: &Path) -> Vec<PathBuf> {
    let mut site_dirs = Vec::new();
    if let Ok(entries) = fs::read_dir(prefix.join("lib")) {
        let mut pythons: Vec<(Vec<u32>, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let version = name.to_str()?.strip_prefix("python3")?.to_string();
                let key = std::iter::once(3)
                    .chain(version.split('.').filter_map(|part| part.parse().ok()))
                    .collect();
                Some((key, entry.path()))
            })
            .collect();
        pythons.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, python) in pythons {
            site_dirs.push(python.join("site-packages"));
            site_dirs.push(python.join("dist-packages"));
        }
    }
    site_dirs.push(prefix.join("Lib").join("site-packages"));

    site_dirs
        .into_iter()
        .map(|site| site.join("paddleocr").join("ppocr").join("utils"))
        .filter(|utils| utils.is_dir())
        .collect()
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn provider(cache: &Path) -> PaddleCacheProvider {
        PaddleCacheProvider::new(PaddleCacheConfig::new(cache.to_path_buf()))
    }

    #[test]
    fn model_dir_follows_cache_layout() {
        let dir = tempdir().unwrap();
        let det = dir.path().join("det").join("ch").join("ch_PP-OCRv4_det_infer");
        fs::create_dir_all(&det).unwrap();

        let resolved = provider(dir.path())
            .model_dir(&ModelIdentity::default(), ModelRole::Detection)
            .unwrap();
        assert_eq!(resolved, det);
    }

    #[test]
    fn missing_model_dir_is_reported() {
        let dir = tempdir().unwrap();
        let err = provider(dir.path())
            .model_dir(&ModelIdentity::default(), ModelRole::Recognition)
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::MissingModelDir {
                role: ModelRole::Recognition,
                ..
            }
        ));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let dir = tempdir().unwrap();
        let err = provider(dir.path())
            .model_dir(&ModelIdentity::new("xx"), ModelRole::Detection)
            .unwrap_err();
        assert!(err.to_string().contains("available: ch, en"));
        assert!(matches!(err, ProviderError::UnknownLanguage(lang) if lang == "xx"));
    }

    #[test]
    fn vocabulary_is_found_in_recognition_dir_first() {
        let dir = tempdir().unwrap();
        let rec = dir.path().join("rec").join("ch").join("ch_PP-OCRv4_rec_infer");
        fs::create_dir_all(&rec).unwrap();
        fs::write(rec.join("ppocr_keys_v1.txt"), "a\r\nb\r\n").unwrap();
        fs::write(dir.path().join("ppocr_keys_v1.txt"), "z\n").unwrap();

        let vocab = provider(dir.path())
            .vocabulary(&ModelIdentity::default())
            .unwrap();
        assert_eq!(vocab.name, "ppocr_keys_v1");
        assert_eq!(vocab.symbols, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn vocabulary_falls_back_to_extra_dirs() {
        let dir = tempdir().unwrap();
        let extra = tempdir().unwrap();
        fs::write(extra.path().join("ppocr_keys_v1.txt"), "一\n二\n一\n").unwrap();

        let mut config = PaddleCacheConfig::new(dir.path().to_path_buf());
        config.dictionary_dirs.push(extra.path().to_path_buf());
        let vocab = PaddleCacheProvider::new(config)
            .vocabulary(&ModelIdentity::default())
            .unwrap();
        assert_eq!(vocab.symbols, vec!["一", "二", "一"]);
    }

    #[test]
    fn explicit_dictionary_names_the_vocabulary() {
        let dir = tempdir().unwrap();
        let dict = dir.path().join("custom_keys.txt");
        fs::write(&dict, "x\n").unwrap();

        let mut config = PaddleCacheConfig::new(dir.path().to_path_buf());
        config.dictionary = Some(dict);
        let vocab = PaddleCacheProvider::new(config)
            .vocabulary(&ModelIdentity::default())
            .unwrap();
        assert_eq!(vocab.name, "custom_keys");
    }

    #[test]
    fn missing_vocabulary_lists_searched_paths() {
        let dir = tempdir().unwrap();
        let err = provider(dir.path())
            .vocabulary(&ModelIdentity::default())
            .unwrap_err();
        match err {
            ProviderError::MissingVocabulary { name, searched } => {
                assert_eq!(name, "ppocr_keys_v1");
                assert!(searched.contains("ppocr_keys_v1.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn install_package_dictionary(prefix: &Path, python: &str, file: &str, text: &str) {
        let utils = prefix
            .join("lib")
            .join(python)
            .join("site-packages")
            .join("paddleocr")
            .join("ppocr")
            .join("utils");
        fs::create_dir_all(&utils).unwrap();
        fs::write(utils.join(file), text).unwrap();
    }

    #[test]
    fn vocabulary_is_found_in_installed_package() {
        let cache = tempdir().unwrap();
        let rec = cache
            .path()
            .join("rec")
            .join("ch")
            .join("ch_PP-OCRv4_rec_infer");
        fs::create_dir_all(&rec).unwrap();
        fs::write(rec.join("inference.pdmodel"), b"graph").unwrap();
        fs::write(rec.join("inference.pdiparams"), b"weights").unwrap();
        fs::write(rec.join("inference.pdiparams.info"), b"info").unwrap();
        let prefix = tempdir().unwrap();
        install_package_dictionary(prefix.path(), "python3.10", "ppocr_keys_v1.txt", "a\nb\n");

        let mut config = PaddleCacheConfig::new(cache.path().to_path_buf());
        config.python_prefixes.push(prefix.path().to_path_buf());
        let vocab = PaddleCacheProvider::new(config)
            .vocabulary(&ModelIdentity::default())
            .unwrap();
        assert_eq!(vocab.name, "ppocr_keys_v1");
        assert_eq!(vocab.symbols, vec!["a", "b"]);
    }

    #[test]
    fn newest_interpreter_wins() {
        let prefix = tempdir().unwrap();
        install_package_dictionary(prefix.path(), "python3.9", "en_dict.txt", "old\n");
        install_package_dictionary(prefix.path(), "python3.11", "en_dict.txt", "new\n");
        fs::create_dir_all(prefix.path().join("lib").join("perl5")).unwrap();

        let dirs = package_utils_dirs(prefix.path());
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].starts_with(prefix.path().join("lib").join("python3.11")));

        let cache = tempdir().unwrap();
        let mut config = PaddleCacheConfig::new(cache.path().to_path_buf());
        config.python_prefixes.push(prefix.path().to_path_buf());
        let vocab = PaddleCacheProvider::new(config)
            .vocabulary(&ModelIdentity::new("en"))
            .unwrap();
        assert_eq!(vocab.symbols, vec!["new"]);
    }

    #[test]
    fn leading_bom_is_stripped() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ppocr_keys_v1.txt"),
            "\u{feff}'\r\n疗\r\n",
        )
        .unwrap();

        let vocab = provider(dir.path())
            .vocabulary(&ModelIdentity::default())
            .unwrap();
        assert_eq!(vocab.symbols, vec!["'", "疗"]);
    }

    #[test]
    fn accelerator_request_is_rejected() {
        let dir = tempdir().unwrap();
        let identity = ModelIdentity::default().with_accelerator(true);
        let provider = provider(dir.path());

        assert!(matches!(
            provider.model_dir(&identity, ModelRole::Detection),
            Err(ProviderError::AcceleratorUnsupported)
        ));
        assert!(matches!(
            provider.vocabulary(&identity),
            Err(ProviderError::AcceleratorUnsupported)
        ));
    }
}
