//! Fixed values mandated by CDA R2 and the C-CDA implementation guides.

/// Default namespace of every CDA document.
pub const HL7_V3_NAMESPACE: &str = "urn:hl7-org:v3";

/// XML Schema instance namespace, needed for `xsi:type` on observation values.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// SDTC extension namespace.
pub const SDTC_NAMESPACE: &str = "urn:hl7-org:sdtc";

/// Realm code required by the US Realm Header.
pub const US_REALM_CODE: &str = "US";

/// `typeId` root for the CDA R2 `POCD_HD000040` message type.
pub const TYPE_ID_ROOT: &str = "2.16.840.1.113883.1.3";

/// `typeId` extension for the CDA R2 `POCD_HD000040` message type.
pub const TYPE_ID_EXTENSION: &str = "POCD_HD000040";

/// Default language when configuration does not supply one.
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Default confidentiality (HL7 Confidentiality "N", normal).
pub const DEFAULT_CONFIDENTIALITY_CODE: &str = "N";

/// Arbitrary example root used when no document id root is configured.
pub const DEFAULT_DOCUMENT_ID_ROOT: &str = "2.16.840.1.113883.19.5.99999.1";

/// Fallback label for uncategorized items in grouped narrative lists.
pub const UNCATEGORIZED_LABEL: &str = "Other";

/// `timezone`-aware timestamp format for CDA `TS` values.
pub const TS_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S%z";

/// Day-precision format for CDA `TS` values.
pub const TS_DATE_FORMAT: &str = "%Y%m%d";

/// Environment variable naming the default C-CDA release for the binary.
pub const ENV_VERSION: &str = "CCDA_VERSION";

/// Environment variable naming the OID used for generated document ids.
pub const ENV_DOCUMENT_ID_ROOT: &str = "CCDA_DOCUMENT_ID_ROOT";

/// Environment variable naming the document language code.
pub const ENV_LANGUAGE_CODE: &str = "CCDA_LANGUAGE_CODE";
