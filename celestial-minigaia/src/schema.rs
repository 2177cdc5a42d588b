//! Column registry: which catalog columns exist and what type each one has.
//!
//! A [`Schema`] maps a column name to its semantic role and the catalog's own
//! type name (`"long"`, `"double"`, ...). Type names are resolved to binary
//! encodings by [`crate::codec::PrimitiveType::from_name`] when a layout is
//! built, so a schema may list types that cannot be stored.

use crate::error::{MiniGaiaError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub role: &'static str,
    pub type_name: &'static str,
}

impl ColumnDef {
    pub const fn new(name: &'static str, role: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            role,
            type_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnDef>,
    by_name: HashMap<&'static str, usize>,
}

impl Schema {
    /// Builds a schema, rejecting duplicated column names.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            if by_name.insert(col.name, idx).is_some() {
                return Err(MiniGaiaError::DuplicateColumn(col.name.to_string()));
            }
        }
        Ok(Self { columns, by_name })
    }

    /// The Gaia DR2 `gaia_source` table.
    pub fn gaia_dr2() -> Self {
        let mut by_name = HashMap::with_capacity(GAIA_DR2_COLUMNS.len());
        for (idx, col) in GAIA_DR2_COLUMNS.iter().enumerate() {
            by_name.insert(col.name, idx);
        }
        Self {
            columns: GAIA_DR2_COLUMNS.to_vec(),
            by_name,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ColumnDef> {
        self.by_name.get(name).map(|&idx| &self.columns[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::gaia_dr2()
    }
}

#[rustfmt::skip]
pub const GAIA_DR2_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("solution_id", "Solution Identifier", "long"),
    ColumnDef::new("designation", "Unique source designation", "string"),
    ColumnDef::new("source_id", "Unique source identifier", "long"),
    ColumnDef::new("random_index", "Random index used to select subsets", "long"),
    ColumnDef::new("ref_epoch", "Reference epoch (Julian year)", "double"),
    ColumnDef::new("ra", "Right ascension (deg)", "double"),
    ColumnDef::new("ra_error", "Standard error of right ascension (mas)", "double"),
    ColumnDef::new("dec", "Declination (deg)", "double"),
    ColumnDef::new("dec_error", "Standard error of declination (mas)", "double"),
    ColumnDef::new("parallax", "Parallax (mas)", "double"),
    ColumnDef::new("parallax_error", "Standard error of parallax (mas)", "double"),
    ColumnDef::new("parallax_over_error", "Parallax divided by its error", "float"),
    ColumnDef::new("pmra", "Proper motion in right ascension direction (mas/yr)", "double"),
    ColumnDef::new("pmra_error", "Standard error of proper motion in right ascension (mas/yr)", "double"),
    ColumnDef::new("pmdec", "Proper motion in declination direction (mas/yr)", "double"),
    ColumnDef::new("pmdec_error", "Standard error of proper motion in declination (mas/yr)", "double"),
    ColumnDef::new("ra_dec_corr", "Correlation between right ascension and declination", "float"),
    ColumnDef::new("ra_parallax_corr", "Correlation between right ascension and parallax", "float"),
    ColumnDef::new("ra_pmra_corr", "Correlation between right ascension and pmra", "float"),
    ColumnDef::new("ra_pmdec_corr", "Correlation between right ascension and pmdec", "float"),
    ColumnDef::new("dec_parallax_corr", "Correlation between declination and parallax", "float"),
    ColumnDef::new("dec_pmra_corr", "Correlation between declination and pmra", "float"),
    ColumnDef::new("dec_pmdec_corr", "Correlation between declination and pmdec", "float"),
    ColumnDef::new("parallax_pmra_corr", "Correlation between parallax and pmra", "float"),
    ColumnDef::new("parallax_pmdec_corr", "Correlation between parallax and pmdec", "float"),
    ColumnDef::new("pmra_pmdec_corr", "Correlation between pmra and pmdec", "float"),
    ColumnDef::new("astrometric_n_obs_al", "Total number of AL observations", "int"),
    ColumnDef::new("astrometric_n_obs_ac", "Total number of AC observations", "int"),
    ColumnDef::new("astrometric_n_good_obs_al", "Number of good AL observations", "int"),
    ColumnDef::new("astrometric_n_bad_obs_al", "Number of bad AL observations", "int"),
    ColumnDef::new("astrometric_gof_al", "Goodness of fit statistic of model wrt AL observations", "float"),
    ColumnDef::new("astrometric_chi2_al", "AL chi-square value", "float"),
    ColumnDef::new("astrometric_excess_noise", "Excess noise of the source (mas)", "double"),
    ColumnDef::new("astrometric_excess_noise_sig", "Significance of excess noise", "double"),
    ColumnDef::new("astrometric_params_solved", "Which parameters have been solved for", "byte"),
    ColumnDef::new("astrometric_primary_flag", "Primary or seconday", "boolean"),
    ColumnDef::new("astrometric_weight_al", "Mean astrometric weight of the source (mas^-2)", "float"),
    ColumnDef::new("astrometric_pseudo_colour", "Astrometrically determined pseudocolour (um^-1)", "double"),
    ColumnDef::new("astrometric_pseudo_colour_error", "Standard error of the pseudocolour (um^-1)", "double"),
    ColumnDef::new("mean_varpi_factor_al", "Mean parallax factor in the AL direction", "float"),
    ColumnDef::new("astrometric_matched_observations", "Matched FOV transits used in the solution", "short"),
    ColumnDef::new("visibility_periods_used", "Number of visibility periods used", "short"),
    ColumnDef::new("astrometric_sigma5d_max", "Longest semi-major axis of the 5-d error ellipsoid (mas)", "float"),
    ColumnDef::new("frame_rotator_object_type", "Type of source for the reference frame", "int"),
    ColumnDef::new("matched_observations", "Number of observations matched to this source", "short"),
    ColumnDef::new("duplicated_source", "Source with duplicate sources", "boolean"),
    ColumnDef::new("phot_g_n_obs", "Number of observations contributing to G photometry", "int"),
    ColumnDef::new("phot_g_mean_flux", "G-band mean flux (e-/s)", "double"),
    ColumnDef::new("phot_g_mean_flux_error", "Error on G-band mean flux (e-/s)", "double"),
    ColumnDef::new("phot_g_mean_flux_over_error", "G-band mean flux divided by its error", "float"),
    ColumnDef::new("phot_g_mean_mag", "G-band mean magnitude (mag)", "float"),
    ColumnDef::new("phot_bp_n_obs", "Number of observations contributing to BP photometry", "int"),
    ColumnDef::new("phot_bp_mean_flux", "Integrated BP mean flux (e-/s)", "double"),
    ColumnDef::new("phot_bp_mean_flux_error", "Error on the integrated BP mean flux (e-/s)", "double"),
    ColumnDef::new("phot_bp_mean_flux_over_error", "Integrated BP mean flux divided by its error", "float"),
    ColumnDef::new("phot_bp_mean_mag", "Integrated BP mean magnitude (mag)", "float"),
    ColumnDef::new("phot_rp_n_obs", "Number of observations contributing to RP photometry", "int"),
    ColumnDef::new("phot_rp_mean_flux", "Integrated RP mean flux (e-/s)", "double"),
    ColumnDef::new("phot_rp_mean_flux_error", "Error on the integrated RP mean flux (e-/s)", "double"),
    ColumnDef::new("phot_rp_mean_flux_over_error", "Integrated RP mean flux divided by its error", "float"),
    ColumnDef::new("phot_rp_mean_mag", "Integrated RP mean magnitude (mag)", "float"),
    ColumnDef::new("phot_bp_rp_excess_factor", "BP/RP excess factor", "float"),
    ColumnDef::new("phot_proc_mode", "Photometry processing mode", "byte"),
    ColumnDef::new("bp_rp", "BP - RP colour (mag)", "float"),
    ColumnDef::new("bp_g", "BP - G colour (mag)", "float"),
    ColumnDef::new("g_rp", "G - RP colour (mag)", "float"),
    ColumnDef::new("radial_velocity", "Radial velocity (km/s)", "double"),
    ColumnDef::new("radial_velocity_error", "Radial velocity error (km/s)", "double"),
    ColumnDef::new("rv_nb_transits", "Number of transits used to compute radial velocity", "int"),
    ColumnDef::new("rv_template_teff", "Teff of the template used to compute radial velocity (K)", "float"),
    ColumnDef::new("rv_template_logg", "logg of the template used to compute radial velocity", "float"),
    ColumnDef::new("rv_template_fe_h", "Fe/H of the template used to compute radial velocity", "float"),
    ColumnDef::new("phot_variable_flag", "Photometric variability flag", "string"),
    ColumnDef::new("l", "Galactic longitude (deg)", "double"),
    ColumnDef::new("b", "Galactic latitude (deg)", "double"),
    ColumnDef::new("ecl_lon", "Ecliptic longitude (deg)", "double"),
    ColumnDef::new("ecl_lat", "Ecliptic latitude (deg)", "double"),
    ColumnDef::new("priam_flags", "Flags for the Apsis-Priam results", "long"),
    ColumnDef::new("teff_val", "Stellar effective temperature (K)", "float"),
    ColumnDef::new("teff_percentile_lower", "Teff uncertainty, 16th percentile (K)", "float"),
    ColumnDef::new("teff_percentile_upper", "Teff uncertainty, 84th percentile (K)", "float"),
    ColumnDef::new("a_g_val", "Line-of-sight extinction in the G band (mag)", "float"),
    ColumnDef::new("a_g_percentile_lower", "a_g_val uncertainty, 16th percentile (mag)", "float"),
    ColumnDef::new("a_g_percentile_upper", "a_g_val uncertainty, 84th percentile (mag)", "float"),
    ColumnDef::new("e_bp_min_rp_val", "Line-of-sight reddening E(BP-RP) (mag)", "float"),
    ColumnDef::new("e_bp_min_rp_percentile_lower", "e_bp_min_rp_val uncertainty, 16th percentile (mag)", "float"),
    ColumnDef::new("e_bp_min_rp_percentile_upper", "e_bp_min_rp_val uncertainty, 84th percentile (mag)", "float"),
    ColumnDef::new("flame_flags", "Flags for the Apsis-FLAME results", "long"),
    ColumnDef::new("radius_val", "Stellar radius (solar radius)", "float"),
    ColumnDef::new("radius_percentile_lower", "radius_val uncertainty, 16th percentile", "float"),
    ColumnDef::new("radius_percentile_upper", "radius_val uncertainty, 84th percentile", "float"),
    ColumnDef::new("lum_val", "Stellar luminosity (solar luminosity)", "float"),
    ColumnDef::new("lum_percentile_lower", "lum_val uncertainty, 16th percentile", "float"),
    ColumnDef::new("lum_percentile_upper", "lum_val uncertainty, 84th percentile", "float"),
];
