//! engine/config.rs
//! Serialized transform configuration.
//!
//! Wire form: `[ magic "FPKC" (4) ][ format version (1) ][ bincode body ]`.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compression::{registry::validate_level, CompressionCodec, ElementFilter};
use crate::dispatch::RECORD_DISPATCH_NAME;
use crate::engine::types::ConfigError;
use crate::schema::{field_spec, FieldTag, NUM_FIELDS, SCHEMA_VERSION};
use crate::types::StreamError;

pub const CONFIG_MAGIC: [u8; 4] = *b"FPKC";
pub const CONFIG_FORMAT_VERSION: u8 = 1;
const CONFIG_PREFIX_LEN: usize = 5;

/// One codec choice: codec, level and pre-coding filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodecSpec {
    pub codec: CompressionCodec,
    pub level: i32,
    pub filter: ElementFilter,
}

impl CodecSpec {
    pub const fn new(codec: CompressionCodec, level: i32, filter: ElementFilter) -> Self {
        Self { codec, level, filter }
    }

    pub const fn raw() -> Self {
        Self::new(CompressionCodec::Raw, 0, ElementFilter::None)
    }

    pub const fn zstd(level: i32) -> Self {
        Self::new(CompressionCodec::Zstd, level, ElementFilter::None)
    }

    pub const fn with_filter(mut self, filter: ElementFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Short label for logs, e.g. `zstd:3+delta`.
    pub fn label(&self) -> String {
        match self.filter {
            ElementFilter::None => format!("{}:{}", self.codec.name(), self.level),
            f => format!("{}:{}+{}", self.codec.name(), self.level, f.name()),
        }
    }
}

/// Field streams sharing one codec. Members must have equal element width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub tags: Vec<FieldTag>,
    pub codec: CodecSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStrategy {
    /// One codec per field, indexed by tag.
    PerField([CodecSpec; NUM_FIELDS]),
    /// Every tag in exactly one cluster.
    Clustered(Vec<ClusterSpec>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    pub format_version: u8,
    pub schema_version: u8,
    /// Registered name of the transform applied to each chunk.
    pub entry_transform: String,
    /// Codec for the tag and size side streams.
    pub aux_codec: CodecSpec,
    pub strategy: FieldStrategy,
}

impl TransformConfig {
    pub fn new(aux_codec: CodecSpec, strategy: FieldStrategy) -> Self {
        Self {
            format_version: CONFIG_FORMAT_VERSION,
            schema_version: SCHEMA_VERSION,
            entry_transform: RECORD_DISPATCH_NAME.to_string(),
            aux_codec,
            strategy,
        }
    }

    /// Untrained default: zstd everywhere, delta on the instruction pointer,
    /// byte shuffle on the address fields.
    pub fn baseline() -> Self {
        let mut per_field = [CodecSpec::zstd(3); NUM_FIELDS];
        per_field[FieldTag::InstructionPointer.index()] =
            CodecSpec::zstd(3).with_filter(ElementFilter::Delta);
        per_field[FieldTag::DestinationMemory.index()] =
            CodecSpec::zstd(3).with_filter(ElementFilter::Shuffle);
        per_field[FieldTag::SourceMemory.index()] =
            CodecSpec::zstd(3).with_filter(ElementFilter::Shuffle);
        Self::new(CodecSpec::zstd(3), FieldStrategy::PerField(per_field))
    }

    /// Check versions, codec levels and strategy shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.format_version != CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion { found: self.format_version });
        }
        if self.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::SchemaMismatch {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        validate_level(self.aux_codec.codec, self.aux_codec.level)?;

        match &self.strategy {
            FieldStrategy::PerField(specs) => {
                for spec in specs {
                    validate_level(spec.codec, spec.level)?;
                }
            }
            FieldStrategy::Clustered(clusters) => {
                let mut seen = [false; NUM_FIELDS];
                for (i, cluster) in clusters.iter().enumerate() {
                    validate_level(cluster.codec.codec, cluster.codec.level)?;
                    let Some(first) = cluster.tags.first() else {
                        return Err(ConfigError::InvalidStrategy(format!("cluster {} is empty", i)));
                    };
                    let width = field_spec(*first).elt_width;
                    for tag in &cluster.tags {
                        if seen[tag.index()] {
                            return Err(ConfigError::InvalidStrategy(format!(
                                "field {} appears in more than one cluster",
                                tag
                            )));
                        }
                        seen[tag.index()] = true;
                        if field_spec(*tag).elt_width != width {
                            return Err(ConfigError::InvalidStrategy(format!(
                                "cluster {} mixes element widths ({} has {}, expected {})",
                                i,
                                tag,
                                field_spec(*tag).elt_width,
                                width
                            )));
                        }
                    }
                }
                if let Some(missing) = FieldTag::ALL.iter().find(|t| !seen[t.index()]) {
                    return Err(ConfigError::InvalidStrategy(format!(
                        "field {} is not assigned to a cluster",
                        missing
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let body = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ConfigError::Encode(e.to_string()))?;
        let mut out = Vec::with_capacity(CONFIG_PREFIX_LEN + body.len());
        out.extend_from_slice(&CONFIG_MAGIC);
        out.push(CONFIG_FORMAT_VERSION);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parse and validate a serialized configuration.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < CONFIG_PREFIX_LEN {
            return Err(ConfigError::Decode(format!(
                "config blob too short: {} bytes",
                bytes.len()
            )));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != CONFIG_MAGIC {
            return Err(ConfigError::BadMagic { found: magic });
        }
        if bytes[4] != CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion { found: bytes[4] });
        }

        let body = &bytes[CONFIG_PREFIX_LEN..];
        let (config, used): (TransformConfig, usize) =
            bincode::serde::decode_from_slice(body, bincode::config::standard())
                .map_err(|e| ConfigError::Decode(e.to_string()))?;
        if used != body.len() {
            return Err(ConfigError::Decode(format!(
                "{} trailing bytes after config body",
                body.len() - used
            )));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing { path: path.to_path_buf() }.into());
            }
            Err(e) => return Err(StreamError::file("read config", path, e)),
        };
        if bytes.is_empty() {
            return Err(ConfigError::Empty { path: path.to_path_buf() }.into());
        }
        log::debug!("[CONFIG] loaded {} bytes from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(&bytes)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize, StreamError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|e| StreamError::file("write config", path, e))?;
        Ok(bytes.len())
    }

    /// One line per section for `-v` output.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![format!("aux: {}", self.aux_codec.label())];
        match &self.strategy {
            FieldStrategy::PerField(specs) => {
                for tag in FieldTag::ALL {
                    lines.push(format!("{}: {}", tag, specs[tag.index()].label()));
                }
            }
            FieldStrategy::Clustered(clusters) => {
                for cluster in clusters {
                    let names: Vec<&str> = cluster.tags.iter().map(|t| t.name()).collect();
                    lines.push(format!("[{}]: {}", names.join(", "), cluster.codec.label()));
                }
            }
        }
        lines
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::baseline()
    }
}
