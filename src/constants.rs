/// Column names and defaults for the ICMS export layout and the Symbiota target schema.
/// Everything here is only a default; `MigrationConfig` carries the values actually used.

// Name-matching service
pub const DEFAULT_NAME_SERVICE_URL: &str = "http://tnrs.iplantc.org/tnrsm-svc/matchNames";
pub const NAME_SERVICE_URL_ENV: &str = "MIGRATOR_NAME_SERVICE_URL";
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.98;

// Join
pub const DEFAULT_LEGACY_ID_PREFIX: &str = "GRSM";
pub const PRIMARY_LEGACY_ID: &str = "Catalog #";
pub const CROSSREF_LEGACY_ID: &str = "GSMNP (number only)";
pub const CROSSREF_TARGET_ID: &str = "SERNEC";

// Source-only fields read by the row derivers (never mapped)
pub const SRC_AGE_STAGE: &str = "Age/Stage";
pub const SRC_AGE: &str = "Age";
pub const SRC_NETWORK: &str = "I-M Network";
pub const SRC_SUBSPECIES: &str = "Sci. Name:Subspecies";
pub const SRC_VARIETY: &str = "Sci. Name:Variety";
pub const SRC_UTM: &str = "UTM Z/E/N";
pub const SRC_LAT_LON: &str = "Lat LongN/W";
pub const SRC_LAT_LON_ALT: &str = "Lat LongN/W:Latitude Longitude";
pub const SRC_LAT_DEGREE: &str = "Lat LongN/W:Latitude Degree";
pub const SRC_LAT_MINUTES: &str = "Lat LongN/W:Latitude Minutes";
pub const SRC_LAT_SECONDS: &str = "Lat LongN/W:Latitude Seconds";
pub const SRC_LON_DEGREE: &str = "Lat LongN/W:Longitude Degree";
pub const SRC_LON_MINUTES: &str = "Lat LongN/W:Longitude Minutes";
pub const SRC_LON_SECONDS: &str = "Lat LongN/W:Longitude Seconds";

// Target (Darwin Core / Symbiota) fields
pub const OTHER_CATALOG_NUMBER: &str = "otherCatalogNumber";
pub const CATALOG_NUMBER: &str = "catalogNumber";
pub const DATE_ENTERED: &str = "dateEntered";
pub const DATE_IDENTIFIED: &str = "dateIdentified";
pub const EVENT_DATE: &str = "eventDate";
pub const MIN_ELEVATION: &str = "minimumElevationInMeters";
pub const COUNTY: &str = "county";
pub const STATE_PROVINCE: &str = "stateProvince";
pub const LOCALITY: &str = "locality";
pub const GENUS: &str = "genus";
pub const SPECIFIC_EPITHET: &str = "specificEpithet";
pub const SCIENTIFIC_NAME: &str = "scientificName";
pub const SCIENTIFIC_NAME_AUTHORSHIP: &str = "scientificNameAuthorship";
pub const SEX: &str = "sex";

// Derived fields appended after the mapped columns
pub const LIFE_STAGE: &str = "lifeStage";
pub const DECIMAL_LATITUDE: &str = "decimalLatitude";
pub const DECIMAL_LONGITUDE: &str = "decimalLongitude";
pub const VERBATIM_COORDINATES: &str = "verbatimCoordinates";

pub const DERIVED_COLUMNS: [&str; 4] = [
    LIFE_STAGE,
    DECIMAL_LATITUDE,
    DECIMAL_LONGITUDE,
    VERBATIM_COORDINATES,
];

/// ICMS column → Symbiota field, in output order.
pub const DEFAULT_FIELD_MAPPING: [(&str, &str); 22] = [
    (PRIMARY_LEGACY_ID, OTHER_CATALOG_NUMBER),
    (CROSSREF_TARGET_ID, CATALOG_NUMBER),
    ("Cataloger", "recordEnteredBy"),
    ("Catalog Date", DATE_ENTERED),
    ("Ident Date", DATE_IDENTIFIED),
    ("Collection Date", EVENT_DATE),
    ("Elevation", MIN_ELEVATION),
    ("Collector", "recordedBy"),
    ("Assoc Spec", "associatedTaxa"),
    ("County", COUNTY),
    ("State", STATE_PROVINCE),
    ("Locality", LOCALITY),
    ("Habitat", "habitat"),
    ("Identified By", "identifiedBy"),
    ("Location", "disposition"),
    ("Kingdom", "kingdom"),
    ("Sci. Name:Genus", GENUS),
    ("Sci. Name:Species", SPECIFIC_EPITHET),
    ("Sci. Name", SCIENTIFIC_NAME),
    ("Sci. Name:Species Authority", SCIENTIFIC_NAME_AUTHORSHIP),
    ("Family", "family"),
    ("Sex", SEX),
];

/// Target fields run through the date normalizer.
pub const DATE_FIELDS: [&str; 3] = [DATE_ENTERED, DATE_IDENTIFIED, EVENT_DATE];

pub const DEFAULT_STATES: [(&str, &str); 2] = [("TN", "Tennessee"), ("NC", "North Carolina")];
