//! MiniLM sentence encoder (all-MiniLM-L6-v2 safetensors weights).
//!
//! This is the same encoder the corpus was prepared with: a six-layer
//! BERT encoder followed by mean pooling and L2 normalization, run on
//! CPU. Scores produced from these vectors land in [0, 1] for typical
//! inputs because the outputs are unit length.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{layer_norm, linear, LayerNorm, Linear, VarBuilder};
use std::path::Path;

use crate::embed::EmbeddingProvider;

struct EncoderConfig {
    hidden: usize,
    intermediate: usize,
    heads: usize,
    layers: usize,
    vocab: usize,
    max_positions: usize,
    type_vocab: usize,
    ln_eps: f64,
}

impl EncoderConfig {
    fn minilm_l6_v2() -> Self {
        Self {
            hidden: 384,
            intermediate: 1536,
            heads: 12,
            layers: 6,
            vocab: 30522,
            max_positions: 512,
            type_vocab: 2,
            ln_eps: 1e-12,
        }
    }

    fn head_dim(&self) -> usize {
        self.hidden / self.heads
    }
}

struct InputEmbeddings {
    word: Tensor,
    position: Tensor,
    token_type: Tensor,
    norm: LayerNorm,
}

impl InputEmbeddings {
    fn load(vb: VarBuilder, cfg: &EncoderConfig) -> Result<Self> {
        let word = vb
            .pp("word_embeddings")
            .get((cfg.vocab, cfg.hidden), "weight")?;
        let position = vb
            .pp("position_embeddings")
            .get((cfg.max_positions, cfg.hidden), "weight")?;
        let token_type = vb
            .pp("token_type_embeddings")
            .get((cfg.type_vocab, cfg.hidden), "weight")?;
        let norm = layer_norm(cfg.hidden, cfg.ln_eps, vb.pp("LayerNorm"))?;
        Ok(Self {
            word,
            position,
            token_type,
            norm,
        })
    }

    /// Token ids -> (1, seq, hidden) input states.
    fn forward(&self, token_ids: &[u32], device: &Device) -> Result<Tensor> {
        let seq_len = token_ids.len();

        let ids = Tensor::new(token_ids, device)?;
        let positions: Vec<u32> = (0..seq_len as u32).collect();
        let positions = Tensor::new(positions.as_slice(), device)?;
        let types = Tensor::zeros(seq_len, DType::U32, device)?;

        let summed = ((self.word.index_select(&ids, 0)?
            + self.position.index_select(&positions, 0)?)?
            + self.token_type.index_select(&types, 0)?)?;

        Ok(self.norm.forward(&summed)?.unsqueeze(0)?)
    }
}

/// One transformer block: post-norm self-attention plus post-norm FFN,
/// the BERT layout (separate biased Q/K/V, GELU, no RoPE).
struct EncoderBlock {
    query: Linear,
    key: Linear,
    value: Linear,
    attn_out: Linear,
    attn_norm: LayerNorm,
    ffn_up: Linear,
    ffn_down: Linear,
    ffn_norm: LayerNorm,
    heads: usize,
    head_dim: usize,
}

impl EncoderBlock {
    fn load(vb: VarBuilder, cfg: &EncoderConfig) -> Result<Self> {
        let h = cfg.hidden;
        let attn = vb.pp("attention");

        Ok(Self {
            query: linear(h, h, attn.pp("self").pp("query"))?,
            key: linear(h, h, attn.pp("self").pp("key"))?,
            value: linear(h, h, attn.pp("self").pp("value"))?,
            attn_out: linear(h, h, attn.pp("output").pp("dense"))?,
            attn_norm: layer_norm(h, cfg.ln_eps, attn.pp("output").pp("LayerNorm"))?,
            ffn_up: linear(h, cfg.intermediate, vb.pp("intermediate").pp("dense"))?,
            ffn_down: linear(cfg.intermediate, h, vb.pp("output").pp("dense"))?,
            ffn_norm: layer_norm(h, cfg.ln_eps, vb.pp("output").pp("LayerNorm"))?,
            heads: cfg.heads,
            head_dim: cfg.head_dim(),
        })
    }

    fn split_heads(&self, x: Tensor, batch: usize, seq: usize) -> Result<Tensor> {
        Ok(x.reshape((batch, seq, self.heads, self.head_dim))?
            .transpose(1, 2)?)
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let (batch, seq, _) = x.dims3()?;

        let q = self.split_heads(self.query.forward(x)?, batch, seq)?;
        let k = self.split_heads(self.key.forward(x)?, batch, seq)?;
        let v = self.split_heads(self.value.forward(x)?, batch, seq)?;

        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let weights = q.matmul(&k.t()?)?.affine(scale, 0.0)?;
        let weights = candle_nn::ops::softmax(&weights, D::Minus1)?;
        let context = weights
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch, seq, self.heads * self.head_dim))?;

        // residual + post-norm, twice
        let x = self
            .attn_norm
            .forward(&(x + self.attn_out.forward(&context)?)?)?;
        let h = self
            .ffn_down
            .forward(&self.ffn_up.forward(&x)?.gelu_erf()?)?;
        Ok(self.ffn_norm.forward(&(x + h)?)?)
    }
}

pub struct SentenceEncoder {
    embeddings: InputEmbeddings,
    blocks: Vec<EncoderBlock>,
    tokenizer: tokenizers::Tokenizer,
    device: Device,
    max_positions: usize,
    hidden: usize,
}

impl SentenceEncoder {
    pub fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        let cfg = EncoderConfig::minilm_l6_v2();
        let device = Device::Cpu;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[model_path], DType::F32, &device)
                .with_context(|| format!("load weights {}", model_path.display()))?
        };

        let embeddings = InputEmbeddings::load(vb.pp("embeddings"), &cfg)?;
        let mut blocks = Vec::with_capacity(cfg.layers);
        for i in 0..cfg.layers {
            blocks.push(EncoderBlock::load(
                vb.pp("encoder").pp("layer").pp(i.to_string()),
                &cfg,
            )?);
        }

        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer {}: {e}", tokenizer_path.display()))?;

        Ok(Self {
            embeddings,
            blocks,
            tokenizer,
            device,
            max_positions: cfg.max_positions,
            hidden: cfg.hidden,
        })
    }

    pub fn dimension(&self) -> usize {
        self.hidden
    }

    fn forward(&self, token_ids: &[u32]) -> Result<Vec<f32>> {
        // questions are short; anything longer is cut at the position limit
        let token_ids = &token_ids[..token_ids.len().min(self.max_positions)];

        let mut hidden = self.embeddings.forward(token_ids, &self.device)?;
        for block in &self.blocks {
            hidden = block.forward(&hidden)?;
        }

        // mean pooling + L2 normalize
        let pooled = hidden.mean(1)?.squeeze(0)?;
        let norm: f32 = pooled.sqr()?.sum_all()?.sqrt()?.to_scalar()?;
        let pooled = if norm > 0.0 {
            pooled.affine(1.0 / norm as f64, 0.0)?
        } else {
            pooled
        };

        Ok(pooled.to_vec1::<f32>()?)
    }
}

impl EmbeddingProvider for SentenceEncoder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        self.forward(encoding.get_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::cosine_similarity;
    use std::path::PathBuf;

    fn model_files() -> Option<(PathBuf, PathBuf)> {
        let base = Path::new(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .nth(2)?
            .join("models");
        let model = base.join("all-MiniLM-L6-v2.safetensors");
        let tokenizer = base.join("all-MiniLM-L6-v2-tokenizer.json");
        (model.exists() && tokenizer.exists()).then_some((model, tokenizer))
    }

    #[test]
    fn encodes_unit_vectors_of_expected_width() {
        let Some((model, tokenizer)) = model_files() else {
            eprintln!("Skipping: all-MiniLM-L6-v2 weights not found");
            return;
        };

        let encoder = SentenceEncoder::load(&model, &tokenizer).unwrap();
        let v = encoder.embed("anxiety feeling worry").unwrap();

        assert_eq!(v.len(), 384);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "expected unit norm, got {norm}");
    }

    #[test]
    fn related_questions_score_higher_than_unrelated() {
        let Some((model, tokenizer)) = model_files() else {
            eprintln!("Skipping: all-MiniLM-L6-v2 weights not found");
            return;
        };

        let encoder = SentenceEncoder::load(&model, &tokenizer).unwrap();
        let anxiety = encoder.embed("anxiety").unwrap();
        let worry = encoder.embed("constant worry nervousness").unwrap();
        let weather = encoder.embed("tomorrow weather forecast").unwrap();

        assert!(
            cosine_similarity(&anxiety, &worry) > cosine_similarity(&anxiety, &weather),
            "related questions should be closer"
        );
    }
}
