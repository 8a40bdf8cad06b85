/*!
 * # CCNs: CMS Certification Number Library
 *
 * A Rust library for canonicalizing, classifying, and decoding CMS
 * Certification Numbers (CCNs).
 *
 * CCNs uniquely identify health care providers and suppliers who interact with
 * the United States Medicare and Medicaid programs, run out of the Centers for
 * Medicare and Medicaid Services (CMS). They are standardized in the State
 * Operations Manual, CMS publication number 100-07.
 *
 * ## Canonical Format
 *
 * - Only `A-Z` and `0-9` are used.
 * - Providers have 6-character CCNs; suppliers have 10-character CCNs.
 * - Characters 1-2 are the State Code ("state" includes countries like Canada
 *   and territories like Guam).
 * - Character 3 may be the Facility Type or Supplier Type, otherwise it is part
 *   of the Sequence Number.
 * - Character 4 may be the Parent Facility Type of a subunit, otherwise it is
 *   part of the Sequence Number.
 * - Character 5 is always part of the Sequence Number.
 * - Character 6 may be the Emergency Hospital Type, otherwise it is part of the
 *   Sequence Number.
 * - Characters 7-10 are only used by suppliers and are always part of the
 *   Sequence Number.
 *
 * ## Quick Start
 *
 * ```
 * use ccns::prelude::*;
 *
 * # fn main() -> Result<()> {
 * // Infer the type from the shape of the code
 * let c = ccn("\t12-p456\n")?;
 * assert_eq!(c.as_str(), "12P456");
 * assert_eq!(c.kind(), CcnType::MedicareProvider);
 * assert_eq!(c.category_description(), "Organ Procurement Organization");
 *
 * // Parse as a known type (length check only)
 * let c = Ccn::parse_as(CcnType::MedicaidOnlyProvider, "12a456")?;
 * println!("{}", c.decode());
 *
 * // Trusted, already-canonical data: no checks at all
 * let c = Ccn::new_unchecked(CcnType::MedicareProvider, "050001");
 * assert_eq!(c.region_name(), "California");
 * # Ok(())
 * # }
 * ```
 *
 * ## Batch Processing
 *
 * ```no_run
 * # use ccns::prelude::*;
 * # fn main() -> Result<()> {
 * let processor = BatchProcessor::new().skip_invalid_records(true);
 * let batch = processor.process_csv("providers.csv", "ccn")?;
 * batch.statistics().print_summary();
 * batch.export("decoded.json", OutputFormat::Json)?;
 * # Ok(())
 * # }
 * ```
 *
 * The lookup tables describe which codes CMS has assigned; a well-formed CCN
 * whose state or facility code is not in them decodes to [`INVALID_STATE`]
 * or [`INVALID_FACILITY_TYPE`](constants::INVALID_FACILITY_TYPE) instead of
 * failing.
 *
 * [`INVALID_STATE`]: constants::INVALID_STATE
 */

// Re-export error types from root
pub use error::{CcnError, Result, OutputFormat};
pub use canonical::{canonicalize, clean_ccn, CanonicalCode, CcnInput, CcnLength};
pub use infer::{infer_ccn_type, CcnType};
pub use decode::{ccn, decode, Ccn, DecodedFields};

// Public modules
pub mod chars;
pub mod tables;
pub mod canonical;
pub mod infer;
pub mod decode;
pub mod error;
pub mod batch;
pub mod config;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use ccns::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canonical::{canonicalize, clean_ccn, CanonicalCode, CcnInput, CcnLength};
    pub use crate::infer::{infer_ccn_type, CcnType};
    pub use crate::decode::{ccn, decode, Ccn, DecodedFields};
    pub use crate::batch::{BatchProcessor, BatchResults, BatchRecord, BatchStatistics};
    pub use crate::error::{CcnError, Result, OutputFormat};
    pub use crate::config::{CcnConfig, ConfigBuilder};
    pub use crate::constants::{INVALID_FACILITY_TYPE, INVALID_STATE};
}

/// CCN constants
pub mod constants {
    /// Length of all provider CCNs
    pub const PROVIDER_CCN_LENGTH: usize = 6;

    /// Length of supplier CCNs
    pub const SUPPLIER_CCN_LENGTH: usize = 10;

    /// Region name reported for a state code missing from the region table
    pub const INVALID_STATE: &str = "INVALID_STATE";

    /// Category description reported for a facility code that is invalid for the CCN type
    pub const INVALID_FACILITY_TYPE: &str = "INVALID_FACILITY_TYPE";

    /// Default CSV column holding CCNs for batch processing
    pub const DEFAULT_CCN_COLUMN: &str = "CCN";
}
