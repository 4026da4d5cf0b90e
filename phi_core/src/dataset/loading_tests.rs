#[cfg(test)]
mod tests {
    use crate::dataset::loading::{parse_loading, parse_loading_str, validate_loading};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test parsing a loading scheme with optimal values
    #[test]
    fn test_parse_full_loading() {
        let json = r#"{
            "name": "hydrology_focus",
            "description": "Water table dominated scheme",
            "optimal_values": {"water_level": -0.1},
            "variable_loadings": {
                "water_level": 0.6,
                "gross_primary_production": 0.4
            }
        }"#;

        let loading = parse_loading_str(json).unwrap();
        assert_eq!(loading.name, "hydrology_focus");
        assert_eq!(loading.loading("water_level"), Some(0.6));
        assert_eq!(loading.loading("unknown"), None);
        assert_eq!(loading.optimal_value("water_level"), Some(-0.1));
        assert_eq!(loading.optimal_value("gross_primary_production"), None);
    }

    /// Test that description and optimal values are optional
    #[test]
    fn test_parse_minimal_loading() {
        let json = r#"{
            "name": "equal",
            "variable_loadings": {"water_level": 1.0}
        }"#;

        let loading = parse_loading_str(json).unwrap();
        assert!(loading.description.is_empty());
        assert!(loading.optimal_values.is_empty());
    }

    /// Test rejection of a scheme naming no variables
    #[test]
    fn test_empty_loading_is_rejected() {
        let json = r#"{"name": "empty", "variable_loadings": {}}"#;
        let err = parse_loading_str(json).unwrap_err();
        assert!(format!("{err:#}").contains("names no variables"));
    }

    /// Test rejection of coefficients outside [-1, 1]
    #[test]
    fn test_out_of_range_coefficient_is_rejected() {
        let json = r#"{
            "name": "bad",
            "variable_loadings": {"water_level": 1.5}
        }"#;
        let err = parse_loading_str(json).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("water_level"));
        assert!(message.contains("1.5"));
    }

    /// Test rejection of a non-finite optimal value
    #[test]
    fn test_non_finite_optimal_is_rejected() {
        use crate::core::domain::VariableLoading;
        use std::collections::BTreeMap;

        let loading = VariableLoading {
            name: "bad".to_string(),
            description: String::new(),
            optimal_values: BTreeMap::from([("water_level".to_string(), f64::NAN)]),
            variable_loadings: BTreeMap::from([("water_level".to_string(), 0.5)]),
        };
        let err = validate_loading(&loading).unwrap_err();
        assert!(format!("{err:#}").contains("optimal value"));
    }

    /// Test that negative and boundary coefficients pass validation
    #[test]
    fn test_boundary_coefficients_are_accepted() {
        let json = r#"{
            "name": "signed",
            "variable_loadings": {"subsidence": -1.0, "water_level": 1.0, "noise": 0.0}
        }"#;
        let loading = parse_loading_str(json).unwrap();
        assert_eq!(loading.loading("subsidence"), Some(-1.0));
        assert_eq!(loading.loading("noise"), Some(0.0));
    }

    /// Test that errors name the offending JSON path
    #[test]
    fn test_bad_coefficient_type_is_reported_by_path() {
        let json = r#"{
            "name": "bad",
            "variable_loadings": {"water_level": "high"}
        }"#;
        let err = parse_loading_str(json).unwrap_err();
        assert!(format!("{err:#}").contains("variable_loadings.water_level"));
    }

    /// Test reading a loading scheme from a file on disk
    #[test]
    fn test_parse_loading_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "equal", "variable_loadings": {{"water_level": 1.0}}}}"#
        )
        .unwrap();

        let loading = parse_loading(file.path()).unwrap();
        assert_eq!(loading.name, "equal");
    }
}
