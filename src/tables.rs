/*!
 * Lookup tables for decoding CCN fields
 *
 * Region (state) codes and facility/supplier type codes as published in the
 * CMS State Operations Manual, publication 100-07. Every lookup returns a
 * sentinel string on a miss instead of failing: a well-formed code that is
 * not in these tables is a normal input, since CMS keeps issuing new codes.
 */

use std::collections::HashMap;

use crate::constants::{INVALID_FACILITY_TYPE, INVALID_STATE};
use crate::infer::CcnType;

/// Two-character region code and the state, territory or country it names
pub const REGIONS: &[(&str, &str)] = &[
    ("01", "Alabama"),
    ("02", "Alaska"),
    ("03", "Arizona"),
    ("04", "Arkansas"),
    ("05", "California"),
    ("06", "Colorado"),
    ("07", "Connecticut"),
    ("08", "Delaware"),
    ("09", "District of Columbia"),
    ("10", "Florida"),
    ("11", "Georgia"),
    ("12", "Hawaii"),
    ("13", "Idaho"),
    ("14", "Illinois"),
    ("15", "Indiana"),
    ("16", "Iowa"),
    ("17", "Kansas"),
    ("18", "Kentucky"),
    ("19", "Louisiana"),
    ("20", "Maine"),
    ("21", "Maryland"),
    ("22", "Massachusetts"),
    ("23", "Michigan"),
    ("24", "Minnesota"),
    ("25", "Mississippi"),
    ("26", "Missouri"),
    ("27", "Montana"),
    ("28", "Nebraska"),
    ("29", "Nevada"),
    ("30", "New Hampshire"),
    ("31", "New Jersey"),
    ("32", "New Mexico"),
    ("33", "New York"),
    ("34", "North Carolina"),
    ("35", "North Dakota"),
    ("36", "Ohio"),
    ("37", "Oklahoma"),
    ("38", "Oregon"),
    ("39", "Pennsylvania"),
    ("40", "Puerto Rico"),
    ("41", "Rhode Island"),
    ("42", "South Carolina"),
    ("43", "South Dakota"),
    ("44", "Tennessee"),
    ("45", "Texas"),
    ("46", "Utah"),
    ("47", "Vermont"),
    ("48", "Virgin Islands"),
    ("49", "Virginia"),
    ("50", "Washington"),
    ("51", "West Virginia"),
    ("52", "Wisconsin"),
    ("53", "Wyoming"),
    ("55", "California"),
    ("56", "Canada"),
    ("59", "Mexico"),
    ("64", "American Samoa"),
    ("65", "Guam"),
    ("66", "Northern Mariana Islands"),
    ("67", "Texas"),
    ("68", "Florida"),
    ("74", "Texas"),
];

/// Medicare sequence-number ranges (positions 3-6) and the facility type each names
pub const MEDICARE_RANGES: &[(u16, u16, &str)] = &[
    (1, 879, "Short-term (General and Specialty) Hospital"),
    (880, 899, "Hospital participating in ORD demonstration project"),
    (900, 999, "Multiple Hospital Component in a Medical Complex (number retired)"),
    (1000, 1199, "Reserved for future use"),
    (1200, 1224, "Alcohol/Drug Hospital (number retired)"),
    (1225, 1299, "Medical Assistance Facility"),
    (1300, 1399, "Critical Access Hospital"),
    (1400, 1499, "Community Mental Health Center"),
    (1500, 1799, "Hospice"),
    (1800, 1989, "Federally Qualified Health Center"),
    (1990, 1999, "Religious Nonmedical Health Care Institution"),
    (2000, 2299, "Long-Term Care Hospital"),
    (2300, 2499, "Hospital-based Renal Dialysis Facility"),
    (2500, 2899, "Independent Renal Dialysis Facility"),
    (2900, 2999, "Independent Special Purpose Renal Dialysis Facility"),
    (3000, 3024, "Tuberculosis Hospital (number retired)"),
    (3025, 3099, "Rehabilitation Hospital"),
    (3100, 3199, "Home Health Agency"),
    (3200, 3299, "Comprehensive Outpatient Rehabilitation Facility"),
    (3300, 3399, "Children's Hospital"),
    (3400, 3499, "Rural Health Clinic (Provider-based)"),
    (3500, 3699, "Hospital-based Satellite Renal Dialysis Facility"),
    (3700, 3799, "Hospital-based Special Purpose Renal Dialysis Facility"),
    (3800, 3974, "Rural Health Clinic (Free-standing)"),
    (3975, 3999, "Rural Health Clinic (Provider-based)"),
    (4000, 4499, "Psychiatric Hospital"),
    (4500, 4599, "Comprehensive Outpatient Rehabilitation Facility"),
    (4600, 4799, "Community Mental Health Center"),
    (4800, 4899, "Comprehensive Outpatient Rehabilitation Facility"),
    (4900, 4999, "Community Mental Health Center"),
    (5000, 6499, "Skilled Nursing Facility"),
    (6500, 6989, "Outpatient Physical Therapy Services"),
    (6990, 6999, "Number Reserved (formerly Christian Science Sanatoria)"),
    (7000, 8499, "Home Health Agency"),
    (8500, 8899, "Rural Health Clinic (Provider-based)"),
    (8900, 8999, "Rural Health Clinic (Free-standing)"),
    (9000, 9799, "Home Health Agency"),
    (9800, 9899, "Transplant Center"),
    (9900, 9999, "Reserved for future use"),
];

/// Letter that replaces the leading sequence digit of Medicare Organ Procurement Organizations
pub const ORGAN_PROCUREMENT_CODE: u8 = b'P';

/// Medicare facility codes that occupy position 3 in place of a sequence digit
pub const MEDICARE_CODES: &[(u8, &str)] = &[
    (ORGAN_PROCUREMENT_CODE, "Organ Procurement Organization"),
];

/// Medicaid-only facility codes (position 3)
pub const MEDICAID_ONLY_CODES: &[(u8, &str)] = &[
    (b'A', "NF (Formerly assigned to Medicaid SNF)"),
    (b'B', "NF (Formerly assigned to Medicaid ICF)"),
    (b'E', "NF (Formerly assigned to ICF)"),
    (b'F', "ICF/IID (Formerly ICF/MR)"),
    (b'G', "ICF/IID"),
    (b'H', "Home Health Agency"),
    (b'J', "Medicaid-Only Hospital"),
    (b'K', "Medicaid HHA"),
    (b'L', "Psychiatric Residential Treatment Facility"),
];

/// IPPS-excluded unit codes (position 3)
pub const IPPS_EXCLUDED_CODES: &[(u8, &str)] = &[
    (b'M', "Psychiatric Unit of a Critical Access Hospital"),
    (b'R', "Rehabilitation Unit of a Critical Access Hospital"),
    (b'S', "Psychiatric Unit"),
    (b'T', "Rehabilitation Unit"),
    (b'U', "Swing-Bed Approval for Short-Term Hospital"),
    (b'W', "Swing-Bed Approval for Long-Term Care Hospital"),
    (b'Y', "Swing-Bed Approval for Rehabilitation Hospital"),
    (b'Z', "Swing-Bed Approval for Critical Access Hospital"),
];

/// Parent facility codes of IPPS-excluded units (position 4)
pub const IPPS_PARENT_CODES: &[(u8, &str)] = &[
    (b'A', "Long-Term Care Hospital"),
    (b'B', "Rehabilitation Hospital"),
    (b'C', "Children's Hospital"),
    (b'D', "Psychiatric Hospital"),
    (b'E', "Critical Access Hospital"),
    (b'F', "Cancer Hospital"),
];

/// Emergency hospital codes (position 6)
pub const EMERGENCY_HOSPITAL_CODES: &[(u8, &str)] = &[
    (b'E', "Non-Participating Emergency Hospital (Non-Federal)"),
    (b'F', "Non-Participating Emergency Hospital (Federal)"),
];

/// Supplier codes (position 3)
pub const SUPPLIER_CODES: &[(u8, &str)] = &[
    (b'C', "Ambulatory Surgical Center"),
    (b'D', "Clinical Laboratory Improvement Amendments of 1988 (CLIA) Laboratory"),
    (b'X', "Portable X-Ray Supplier"),
];

lazy_static::lazy_static! {
    static ref REGION_INDEX: HashMap<&'static str, &'static str> =
        REGIONS.iter().copied().collect();
}

fn find(table: &[(u8, &'static str)], code: u8) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, desc)| *desc)
}

/// Look up a two-character region code, or `None` if it is not assigned
pub fn lookup_region(code: &str) -> Option<&'static str> {
    REGION_INDEX.get(code).copied()
}

/// Region name for a two-character code, or [`INVALID_STATE`]
pub fn region_name(code: &str) -> &'static str {
    lookup_region(code).unwrap_or(INVALID_STATE)
}

/// Category table used at the primary category position of a CCN type
pub fn categories(kind: CcnType) -> &'static [(u8, &'static str)] {
    match kind {
        CcnType::MedicareProvider => MEDICARE_CODES,
        CcnType::MedicaidOnlyProvider => MEDICAID_ONLY_CODES,
        CcnType::IppsExcludedProvider => IPPS_EXCLUDED_CODES,
        CcnType::EmergencyHospital => EMERGENCY_HOSPITAL_CODES,
        CcnType::Supplier => SUPPLIER_CODES,
    }
}

/// Look up a category character in the table of a CCN type
pub fn lookup_category(kind: CcnType, code: u8) -> Option<&'static str> {
    find(categories(kind), code)
}

/// Category description for a CCN type, or [`INVALID_FACILITY_TYPE`]
pub fn category_description(kind: CcnType, code: u8) -> &'static str {
    lookup_category(kind, code).unwrap_or(INVALID_FACILITY_TYPE)
}

/// Look up the parent facility of an IPPS-excluded unit
pub fn lookup_ipps_parent(code: u8) -> Option<&'static str> {
    find(IPPS_PARENT_CODES, code)
}

/// Facility type named by a Medicare sequence number (positions 3-6)
pub fn lookup_medicare_range(sequence: u32) -> Option<&'static str> {
    MEDICARE_RANGES
        .iter()
        .find(|(lo, hi, _)| (*lo as u32..=*hi as u32).contains(&sequence))
        .map(|(_, _, desc)| *desc)
}
