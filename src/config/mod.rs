//! Configuration types for the reordering pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column separator used when parsing input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Comma if the content contains one, whitespace otherwise.
    #[default]
    Auto,
    Comma,
    Tab,
    /// Runs of spaces and/or tabs.
    Whitespace,
}

/// Output serialization for a reordered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Txt,
}

impl ExportFormat {
    /// Field separator byte for this format.
    #[inline]
    pub fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Txt => b'\t',
        }
    }

    /// File extension without the dot.
    #[inline]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }
}

/// Configuration for reading input tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Column separator
    #[serde(default)]
    pub delimiter: Delimiter,
}

/// Configuration for the reordering step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderConfig {
    /// Column supplying x; guessed from the header when unset
    #[serde(default)]
    pub x_field: Option<String>,

    /// Column supplying y; guessed from the header when unset
    #[serde(default)]
    pub y_field: Option<String>,

    /// Maximum number of points accepted in one table
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_max_points() -> usize {
    1_000_000
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            x_field: None,
            y_field: None,
            max_points: default_max_points(),
        }
    }
}

/// Configuration for exporting reordered tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Formats written for each table
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,

    /// File name for CSV output in single-file mode
    #[serde(default = "default_csv_file_name")]
    pub csv_file_name: String,

    /// File name for TXT output in single-file mode
    #[serde(default = "default_txt_file_name")]
    pub txt_file_name: String,
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Csv, ExportFormat::Txt]
}

fn default_csv_file_name() -> String {
    "sorted_tunnel_data.csv".to_string()
}

fn default_txt_file_name() -> String {
    "sorted_tunnel_data.txt".to_string()
}

impl ExportConfig {
    /// Single-file output name for `format`.
    pub fn file_name(&self, format: ExportFormat) -> &str {
        match format {
            ExportFormat::Csv => &self.csv_file_name,
            ExportFormat::Txt => &self.txt_file_name,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            csv_file_name: default_csv_file_name(),
            txt_file_name: default_txt_file_name(),
        }
    }
}

/// Configuration for the PNG shape preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Image width in pixels
    #[serde(default = "default_plot_size")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_plot_size")]
    pub height: u32,

    /// Radius of ordinary points
    #[serde(default = "default_point_radius")]
    pub point_radius: u32,

    /// Radius of the start point
    #[serde(default = "default_start_radius")]
    pub start_radius: u32,
}

fn default_plot_size() -> u32 {
    1000
}

fn default_point_radius() -> u32 {
    3
}

fn default_start_radius() -> u32 {
    7
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_size(),
            height: default_plot_size(),
            point_radius: default_point_radius(),
            start_radius: default_start_radius(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub reorder: ReorderConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.loader.delimiter, Delimiter::Auto);
        assert_eq!(config.reorder.max_points, 1_000_000);
        assert!(config.reorder.x_field.is_none());
        assert_eq!(config.export.formats, vec![ExportFormat::Csv, ExportFormat::Txt]);
        assert_eq!(config.export.file_name(ExportFormat::Txt), "sorted_tunnel_data.txt");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "reorder:\n  x_field: x2\n  max_points: 10\nloader:\n  delimiter: tab\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.reorder.x_field.as_deref(), Some("x2"));
        assert!(config.reorder.y_field.is_none());
        assert_eq!(config.reorder.max_points, 10);
        assert_eq!(config.loader.delimiter, Delimiter::Tab);
        assert_eq!(config.plot.width, 1000);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = PipelineConfig::default();
        config.export.formats = vec![ExportFormat::Txt];
        config.reorder.y_field = Some("y1".to_string());
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded.export.formats, vec![ExportFormat::Txt]);
        assert_eq!(loaded.reorder.y_field.as_deref(), Some("y1"));
    }

    #[test]
    fn test_export_format_properties() {
        assert_eq!(ExportFormat::Csv.delimiter(), b',');
        assert_eq!(ExportFormat::Txt.delimiter(), b'\t');
        assert_eq!(ExportFormat::Txt.extension(), "txt");
    }
}
