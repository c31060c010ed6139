/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Length of one FITS header card.
pub const CARD_LEN: usize = 80;

/// Width of the keyword name field at the start of a card.
pub const KEYWORD_LEN: usize = 8;

/// Default frame-type keyword.
pub const IMAGETYP_KEY: &str = "IMAGETYP";

/// Frame-type keyword used by the Swope CCD.
pub const EXPTYPE_KEY: &str = "EXPTYPE";

/// Filter name keyword.
pub const FILTER_KEY: &str = "FILTER";

/// Trim section keyword on amplifier extensions.
pub const TRIMSEC_KEY: &str = "TRIMSEC";

/// File stem of the master bias.
pub const MASTER_BIAS_STEM: &str = "masterbias";

/// File stem prefix of per-filter master flats.
pub const MASTER_FLAT_STEM: &str = "masterflat";

/// Suffix appended to the stem of bias/flat corrected science frames.
pub const CORRECTED_SUFFIX: &str = "-bsub_flat";

/// Keywords the FITS writer regenerates itself; never carried in a `Header`.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "SIMPLE", "BITPIX", "NAXIS", "EXTEND", "BZERO", "BSCALE", "XTENSION", "PCOUNT", "GCOUNT",
    "EXTNAME", "END",
];

/// Keywords copied from a representative input frame onto derived masters.
pub const DEFAULT_PROPAGATED_KEYWORDS: &[&str] = &[
    "DETSIZE", "CCDSUM", "TIMESYS", "OBJECT", "DATE-OBS", "DARKTIME", "TIMEZONE", "IMAGETYP",
    "INSTRUME", "DEWTEMP", "LST-OBS", "OBSERVER", "JULIAN", "OBSERVAT", "EPOCH", "CAMTEMP", "UT",
    "TIME-OBS", "ST", "EXPTIME",
];

/// COMMENT lines cfitsio writes into every new primary header.
pub const CFITSIO_PRIMARY_COMMENTS: &[&str] = &[
    "FITS (Flexible Image Transport System) format is defined in 'Astronomy",
    "and Astrophysics', volume 376, page 359; bibcode: 2001A&A...376..359H",
];
