use crate::error::ConfigError;
use crate::io::netcdf::GlobalMeta;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// Settings file as written by users; keys keep their historical spelling
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
struct SettingsFile {
    static_data_path: String,
    DEM_name: String,
    Area_cell_name: String,
    Glacier_mask_name: String,
    Glacier_value_in_mask: f64,
    nodata_value: f64,
    static_data_output_path: String,
    static_data_output_name: String,
    domain: String,
    project: String,
    sim_regrid_on_DEM: bool,

    glacier_thickness: bool,
    Glacier_thickness_name: Option<String>,
    glacier_ID: bool,
    Glacier_ID_name: Option<String>,
    deltaH_pivot_table: bool,
    deltaH_pivot_table_name: Option<String>,
    mask: bool,
    mask_name: Option<String>,
    Glacier_debris: bool,
    Glacier_debris_name: Option<String>,

    institution: Option<String>,
    website: Option<String>,
    comment: Option<String>,
    email: Option<String>,
    compress_output: Option<bool>,
}

/// Validated run settings. Optional layers are `None` when disabled.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dem: PathBuf,
    pub area_cell: PathBuf,
    pub glacier_mask: PathBuf,
    pub glacier_thickness: Option<PathBuf>,
    pub glacier_id: Option<PathBuf>,
    pub pivot_table: Option<PathBuf>,
    pub domain_mask: Option<PathBuf>,
    pub glacier_debris: Option<PathBuf>,
    pub glacier_value: f64,
    pub nodata_value: f64,
    pub regrid_on_dem: bool,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub domain: String,
    pub project: String,
    pub institution: String,
    pub website: String,
    pub comment: String,
    pub email: String,
    pub compress_output: bool,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    pub fn from_json(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: SettingsFile =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::validate(raw)
    }

    fn validate(raw: SettingsFile) -> Result<Self, ConfigError> {
        let root = PathBuf::from(required("static_data_path", &raw.static_data_path)?);
        let input = |key: &'static str, name: &str| -> Result<PathBuf, ConfigError> {
            Ok(root.join(required(key, name)?))
        };
        let optional = |flag: &'static str,
                        enabled: bool,
                        key: &'static str,
                        name: &Option<String>|
         -> Result<Option<PathBuf>, ConfigError> {
            if !enabled {
                return Ok(None);
            }
            match name.as_deref() {
                Some(name) => input(key, name).map(Some),
                None => Err(ConfigError::MissingLayerName { flag, key }),
            }
        };

        if !raw.nodata_value.is_finite() {
            return Err(ConfigError::Invalid {
                key: "nodata_value",
                reason: "must be a finite number".into(),
            });
        }

        Ok(Settings {
            dem: input("DEM_name", &raw.DEM_name)?,
            area_cell: input("Area_cell_name", &raw.Area_cell_name)?,
            glacier_mask: input("Glacier_mask_name", &raw.Glacier_mask_name)?,
            glacier_thickness: optional(
                "glacier_thickness",
                raw.glacier_thickness,
                "Glacier_thickness_name",
                &raw.Glacier_thickness_name,
            )?,
            glacier_id: optional(
                "glacier_ID",
                raw.glacier_ID,
                "Glacier_ID_name",
                &raw.Glacier_ID_name,
            )?,
            pivot_table: optional(
                "deltaH_pivot_table",
                raw.deltaH_pivot_table,
                "deltaH_pivot_table_name",
                &raw.deltaH_pivot_table_name,
            )?,
            domain_mask: optional("mask", raw.mask, "mask_name", &raw.mask_name)?,
            glacier_debris: optional(
                "Glacier_debris",
                raw.Glacier_debris,
                "Glacier_debris_name",
                &raw.Glacier_debris_name,
            )?,
            glacier_value: raw.Glacier_value_in_mask,
            nodata_value: raw.nodata_value,
            regrid_on_dem: raw.sim_regrid_on_DEM,
            output_dir: PathBuf::from(&raw.static_data_output_path),
            output_name: required("static_data_output_name", &raw.static_data_output_name)?
                .to_string(),
            domain: raw.domain,
            project: raw.project,
            institution: raw
                .institution
                .unwrap_or_else(|| "CIMA Research Foundation".to_string()),
            website: raw
                .website
                .unwrap_or_else(|| "http://www.cimafoundation.org".to_string()),
            comment: raw
                .comment
                .unwrap_or_else(|| "Author(s): Francesco Avanzi, Fabio Delogu".to_string()),
            email: raw
                .email
                .unwrap_or_else(|| "francesco.avanzi@cimafoundation.org".to_string()),
            compress_output: raw.compress_output.unwrap_or(true),
        })
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    pub fn global_meta(&self) -> GlobalMeta {
        GlobalMeta {
            filename: self.output_name.clone(),
            domain: self.domain.clone(),
            project: self.project.clone(),
            institution: self.institution.clone(),
            website: self.website.clone(),
            comment: self.comment.clone(),
            email: self.email.clone(),
            nodata_value: self.nodata_value,
        }
    }
}

fn required<'a>(key: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn base() -> Value {
        json!({
            "static_data_path": "/data/static",
            "DEM_name": "DEM.txt",
            "Area_cell_name": "AreaCell.txt",
            "Glacier_mask_name": "GlacierMask.txt",
            "Glacier_value_in_mask": 5,
            "nodata_value": -9999,
            "static_data_output_path": "/data/out",
            "static_data_output_name": "S3M_static.nc",
            "domain": "Aosta",
            "project": "S3M",
            "sim_regrid_on_DEM": true,
            "glacier_thickness": true,
            "Glacier_thickness_name": "Thickness.tif",
            "glacier_ID": false,
            "deltaH_pivot_table": false,
            "mask": false,
            "Glacier_debris": false
        })
    }

    fn parse(value: &Value) -> Result<Settings, ConfigError> {
        Settings::from_json(&value.to_string(), Path::new("configuration.json"))
    }

    #[test]
    fn valid_settings_resolve_paths() {
        let settings = parse(&base()).unwrap();

        assert_eq!(settings.dem, PathBuf::from("/data/static/DEM.txt"));
        assert_eq!(
            settings.glacier_thickness,
            Some(PathBuf::from("/data/static/Thickness.tif"))
        );
        assert_eq!(settings.glacier_id, None);
        assert_eq!(settings.glacier_value, 5.0);
        assert_eq!(
            settings.output_file(),
            PathBuf::from("/data/out/S3M_static.nc")
        );
        assert!(settings.compress_output);
        assert_eq!(settings.institution, "CIMA Research Foundation");
    }

    #[test]
    fn disabled_layers_need_no_name() {
        let mut value = base();
        value["glacier_thickness"] = json!(false);
        value
            .as_object_mut()
            .unwrap()
            .remove("Glacier_thickness_name");

        assert_eq!(parse(&value).unwrap().glacier_thickness, None);
    }

    #[test]
    fn missing_key_names_the_key() {
        let mut value = base();
        value.as_object_mut().unwrap().remove("DEM_name");

        let err = parse(&value).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("DEM_name"));
    }

    #[test]
    fn enabled_layer_without_name_is_rejected() {
        let mut value = base();
        value["mask"] = json!(true);

        assert!(matches!(
            parse(&value),
            Err(ConfigError::MissingLayerName {
                flag: "mask",
                key: "mask_name"
            })
        ));
    }

    #[test]
    fn wrong_types_and_empty_names_are_rejected() {
        let mut value = base();
        value["sim_regrid_on_DEM"] = json!("yes");
        assert!(matches!(parse(&value), Err(ConfigError::Parse { .. })));

        let mut value = base();
        value["Area_cell_name"] = json!("  ");
        assert!(matches!(
            parse(&value),
            Err(ConfigError::Empty("Area_cell_name"))
        ));
    }

    #[test]
    fn metadata_defaults_and_overrides() {
        let settings = parse(&base()).unwrap();
        assert_eq!(settings.comment, "Author(s): Francesco Avanzi, Fabio Delogu");
        assert_eq!(settings.email, "francesco.avanzi@cimafoundation.org");

        let mut value = base();
        value["comment"] = json!("Aosta valley setup");
        value["email"] = json!("ops@example.org");
        let settings = parse(&value).unwrap();
        assert_eq!(settings.comment, "Aosta valley setup");
        assert_eq!(settings.email, "ops@example.org");
        assert_eq!(settings.global_meta().email, "ops@example.org");
    }
}
