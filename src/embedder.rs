use candle_core::Device;
use pylate_rs::ColBERT;

use crate::error::{Error, Result};

pub const DEFAULT_MODEL_ID: &str = "lightonai/GTE-ModernColBERT-v1";
pub const MODEL_ENV_VAR: &str = "ASSESSREC_MODEL";

/// The embedding collaborator: turns texts into fixed-dimension vectors.
///
/// Implementations must be deterministic for a fixed model version and
/// return one vector per input, all with the same dimension for the process
/// lifetime.
pub trait Embedder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn encode_one(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode(std::slice::from_ref(&text.to_string()))?;
        vectors
            .pop()
            .ok_or_else(|| Error::Retrieval("embedder returned no vector".to_string()))
    }
}

/// Select the best available compute device.
///
/// Uses CUDA when compiled with the `cuda` feature, Metal when compiled with
/// the `metal` feature, and falls back to CPU otherwise.
fn default_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            return device;
        }
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            return device;
        }
    }

    Device::Cpu
}

/// Manages the sentence-encoder lifecycle, supporting lazy loading on first
/// use.
///
/// Token-level model output is mean-pooled and L2-normalized into one
/// sentence vector per input text.
pub struct ModelManager {
    model: Option<ColBERT>,
    model_id: String,
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelManager {
    /// The model ID is resolved from the `ASSESSREC_MODEL` environment
    /// variable when set, otherwise the default model. Nothing is loaded
    /// until the first encode call.
    pub fn new() -> Self {
        let model_id =
            std::env::var(MODEL_ENV_VAR).unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        Self {
            model: None,
            model_id,
        }
    }

    /// Creates a `ModelManager` with an explicit model ID, bypassing
    /// environment variable resolution.
    pub fn with_model_id(model_id: String) -> Self {
        Self {
            model: None,
            model_id,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Ensures the model is loaded, downloading from HuggingFace Hub if
    /// needed.
    fn ensure_loaded(&mut self) -> Result<&mut ColBERT> {
        if self.model.is_none() {
            let device = default_device();
            let colbert: ColBERT = ColBERT::from(&self.model_id)
                .with_device(device)
                .try_into()
                .map_err(|e| Error::Retrieval(format!("failed to load model: {e}")))?;
            self.model = Some(colbert);
        }

        Ok(self.model.as_mut().unwrap())
    }
}

impl Embedder for ModelManager {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.ensure_loaded()?;
        // [batch, tokens, dim]
        let token_embeddings = model
            .encode(texts, false)
            .map_err(|e| Error::Retrieval(format!("encode failed: {e}")))?;

        let pooled = token_embeddings
            .mean(1)
            .map_err(|e| Error::Retrieval(format!("mean pooling failed: {e}")))?;
        let mut rows: Vec<Vec<f32>> = pooled
            .to_vec2::<f32>()
            .map_err(|e| Error::Retrieval(format!("tensor conversion failed: {e}")))?;

        for row in &mut rows {
            l2_normalize_in_place(row);
        }
        Ok(rows)
    }
}

/// Deterministic offline embedder: a hashed bag-of-words vector.
///
/// Texts sharing tokens get genuine cosine overlap, which is all the tests
/// and offline runs need. Not a semantic model.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let slot = (fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            vector[slot] += 1.0;
        }
        l2_normalize_in_place(&mut vector);
        vector
    }
}

impl Embedder for HashEmbedder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }
}

fn l2_normalize_in_place(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
