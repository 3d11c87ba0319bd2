use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierError, LinearSvc, TfidfVectorizer};

/// File name of the persisted vectorizer.
pub const VECTORIZER_FILE_NAME: &str = "model_vectorizer.pickle";
/// File name of the persisted classifier.
pub const MODEL_FILE_NAME: &str = "classification.model";

const FORMAT_VERSION: u32 = 1;

/// Environment variable overriding the default artifacts directory.
pub const ARTIFACTS_DIR_ENV: &str = "INTENT_CLASSIFIER_ARTIFACTS";

fn artifacts_dir_from(value: Option<String>) -> PathBuf {
    match value {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from("."),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Encoding error: {0}")]
    EncodingError(#[from] bincode::Error),
    #[error("Expected a {expected} artifact, found a {actual} artifact")]
    KindMismatch {
        expected: ArtifactKind,
        actual: ArtifactKind,
    },
    #[error("Unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Vectorizer,
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vectorizer => write!(f, "vectorizer"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A fitted object that can be written to and read back from disk.
pub trait Artifact: Serialize + DeserializeOwned {
    const KIND: ArtifactKind;
}

impl Artifact for TfidfVectorizer {
    const KIND: ArtifactKind = ArtifactKind::Vectorizer;
}

impl Artifact for LinearSvc {
    const KIND: ArtifactKind = ArtifactKind::Model;
}

/// On-disk framing. `payload` is the bincode encoding of the artifact and
/// `checksum` its hex SHA-256.
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    kind: ArtifactKind,
    format_version: u32,
    checksum: String,
    payload: Vec<u8>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    path.with_file_name(tmp_name)
}

/// Encodes an artifact into the `.tmp` sibling of `path` and returns the
/// temporary path. `path` itself is not touched.
fn stage_artifact<T: Artifact>(path: &Path, artifact: &T) -> Result<PathBuf, ArtifactError> {
    let payload = bincode::serialize(artifact)?;
    let envelope = ArtifactEnvelope {
        kind: T::KIND,
        format_version: FORMAT_VERSION,
        checksum: sha256_hex(&payload),
        payload,
    };
    let bytes = bincode::serialize(&envelope)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path_for(path);
    log::debug!("Writing {} bytes to {:?}", bytes.len(), tmp_path);
    if let Err(e) = fs::write(&tmp_path, &bytes) {
        discard_staged(&tmp_path);
        return Err(e.into());
    }
    Ok(tmp_path)
}

/// Moves a staged file over its final location.
fn commit_artifact(tmp_path: &Path, path: &Path) -> Result<(), ArtifactError> {
    if let Err(e) = fs::rename(tmp_path, path) {
        discard_staged(tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn discard_staged(tmp_path: &Path) {
    if tmp_path.is_file() {
        let _ = fs::remove_file(tmp_path);
    }
}

/// Serializes an artifact to `path`, replacing any existing file.
///
/// The bytes are first written to a sibling `.tmp` file which is then renamed
/// over `path`.
pub fn write_artifact<T: Artifact>(path: &Path, artifact: &T) -> Result<(), ArtifactError> {
    let tmp_path = stage_artifact(path, artifact)?;
    commit_artifact(&tmp_path, path)?;
    log::info!("Wrote {} artifact to {:?}", T::KIND, path);
    Ok(())
}

/// Reads an artifact written by [`write_artifact`], verifying its kind,
/// format version and checksum.
pub fn read_artifact<T: Artifact>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path)?;
    log::debug!("Read {} bytes from {:?}", bytes.len(), path);
    let envelope: ArtifactEnvelope = bincode::deserialize(&bytes)?;

    if envelope.kind != T::KIND {
        return Err(ArtifactError::KindMismatch {
            expected: T::KIND,
            actual: envelope.kind,
        });
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion(envelope.format_version));
    }

    let actual = sha256_hex(&envelope.payload);
    if actual != envelope.checksum {
        log::error!(
            "{} artifact {:?} checksum mismatch: expected {}, got {}",
            T::KIND,
            path,
            envelope.checksum,
            actual
        );
        return Err(ArtifactError::ChecksumMismatch {
            expected: envelope.checksum,
            actual,
        });
    }

    Ok(bincode::deserialize(&envelope.payload)?)
}

/// Loads a vectorizer artifact from an arbitrary path.
pub fn load_vectorizer<P: AsRef<Path>>(path: P) -> Result<TfidfVectorizer, ClassifierError> {
    load(path.as_ref())
}

/// Loads a model artifact from an arbitrary path.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LinearSvc, ClassifierError> {
    load(path.as_ref())
}

fn load<T: Artifact>(path: &Path) -> Result<T, ClassifierError> {
    read_artifact(path).map_err(|source| ClassifierError::ArtifactLoadError {
        path: path.to_path_buf(),
        source,
    })
}

fn write_error(path: &Path) -> impl FnOnce(ArtifactError) -> ClassifierError + '_ {
    move |source| ClassifierError::ArtifactWriteError {
        path: path.to_path_buf(),
        source,
    }
}

/// Locates the vectorizer and model artifacts inside one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory: `INTENT_CLASSIFIER_ARTIFACTS`
    /// when set, otherwise the current working directory.
    pub fn get_default_artifacts_dir() -> PathBuf {
        artifacts_dir_from(env::var(ARTIFACTS_DIR_ENV).ok())
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.artifacts_dir.join(VECTORIZER_FILE_NAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_FILE_NAME)
    }

    /// Whether both artifact files exist. Their contents are not checked.
    pub fn is_trained(&self) -> bool {
        let vectorizer_path = self.vectorizer_path();
        let model_path = self.model_path();
        log::debug!("Checking for trained artifacts:");
        log::debug!("  Vectorizer path: {:?} (exists: {})", vectorizer_path, vectorizer_path.exists());
        log::debug!("  Model path: {:?} (exists: {})", model_path, model_path.exists());
        vectorizer_path.exists() && model_path.exists()
    }

    /// Persists both fitted objects, overwriting previous artifacts.
    ///
    /// Both files are staged before either is moved into place, so a failed
    /// write leaves the previous pair untouched.
    pub fn save(&self, vectorizer: &TfidfVectorizer, model: &LinearSvc) -> Result<(), ClassifierError> {
        let vectorizer_path = self.vectorizer_path();
        let model_path = self.model_path();

        let vectorizer_tmp = stage_artifact(&vectorizer_path, vectorizer).map_err(write_error(&vectorizer_path))?;
        let model_tmp = match stage_artifact(&model_path, model) {
            Ok(tmp) => tmp,
            Err(source) => {
                discard_staged(&vectorizer_tmp);
                return Err(write_error(&model_path)(source));
            }
        };

        if let Err(source) = commit_artifact(&vectorizer_tmp, &vectorizer_path) {
            discard_staged(&model_tmp);
            return Err(write_error(&vectorizer_path)(source));
        }
        commit_artifact(&model_tmp, &model_path).map_err(write_error(&model_path))?;

        log::info!("Wrote vectorizer and model artifacts to {:?}", self.artifacts_dir);
        Ok(())
    }

    pub fn load_vectorizer(&self) -> Result<TfidfVectorizer, ClassifierError> {
        load(&self.vectorizer_path())
    }

    pub fn load_model(&self) -> Result<LinearSvc, ClassifierError> {
        load(&self.model_path())
    }

    /// Checks that both artifacts decode and pass checksum verification.
    pub fn verify(&self) -> bool {
        match (self.load_vectorizer(), self.load_model()) {
            (Ok(_), Ok(_)) => true,
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Artifact verification failed: {}", e);
                false
            }
        }
    }

    /// Deletes both artifacts if present.
    pub fn remove(&self) -> Result<(), ClassifierError> {
        for path in [self.vectorizer_path(), self.model_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| ClassifierError::ArtifactWriteError {
                    path: path.clone(),
                    source: e.into(),
                })?;
            }
        }
        Ok(())
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new_default()
    }
}
