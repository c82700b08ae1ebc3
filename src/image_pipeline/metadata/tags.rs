//! EXIF tag ids the extractor interprets, and display names for the rest.

pub const IMAGE_WIDTH: u16 = 0x0100;
pub const IMAGE_LENGTH: u16 = 0x0101;
pub const IMAGE_DESCRIPTION: u16 = 0x010E;
pub const MAKE: u16 = 0x010F;
pub const MODEL: u16 = 0x0110;
pub const ARTIST: u16 = 0x013B;
pub const YCBCR_POSITIONING: u16 = 0x0213;
pub const EXPOSURE_TIME: u16 = 0x829A;
pub const EXIF_IFD_POINTER: u16 = 0x8769;
pub const ISO_SPEED_RATINGS: u16 = 0x8827;
pub const GPS_INFO: u16 = 0x8825;
pub const COMPONENTS_CONFIGURATION: u16 = 0x9101;
pub const SHUTTER_SPEED_VALUE: u16 = 0x9201;
pub const MAKER_NOTE: u16 = 0x927C;
pub const COLOR_SPACE: u16 = 0xA001;
pub const EXIF_IMAGE_WIDTH: u16 = 0xA002;
pub const EXIF_IMAGE_HEIGHT: u16 = 0xA003;
pub const INTEROP_IFD_POINTER: u16 = 0xA005;

/// Keys of the GPS sub-record.
pub mod gps {
    pub const LATITUDE_REF: u16 = 1;
    pub const LATITUDE: u16 = 2;
    pub const LONGITUDE_REF: u16 = 3;
    pub const LONGITUDE: u16 = 4;
    pub const ALTITUDE_REF: u16 = 5;
    pub const ALTITUDE: u16 = 6;

    const NAMES: &[(u16, &str)] = &[
        (0, "GPSVersionID"),
        (LATITUDE_REF, "GPSLatitudeRef"),
        (LATITUDE, "GPSLatitude"),
        (LONGITUDE_REF, "GPSLongitudeRef"),
        (LONGITUDE, "GPSLongitude"),
        (ALTITUDE_REF, "GPSAltitudeRef"),
        (ALTITUDE, "GPSAltitude"),
        (7, "GPSTimeStamp"),
        (29, "GPSDateStamp"),
    ];

    /// Coerces a sub-record key to its numeric id: decimal or `0x` hex
    /// numbers, or a known GPS tag name.
    pub fn key_id(key: &str) -> Option<u16> {
        super::lookup(key, NAMES)
    }
}

const NAMES: &[(u16, &str)] = &[
    (IMAGE_WIDTH, "ImageWidth"),
    (IMAGE_LENGTH, "ImageLength"),
    (IMAGE_DESCRIPTION, "ImageDescription"),
    (MAKE, "Make"),
    (MODEL, "Model"),
    (0x0112, "Orientation"),
    (0x011A, "XResolution"),
    (0x011B, "YResolution"),
    (0x0128, "ResolutionUnit"),
    (0x0131, "Software"),
    (0x0132, "DateTime"),
    (ARTIST, "Artist"),
    (YCBCR_POSITIONING, "YCbCrPositioning"),
    (EXPOSURE_TIME, "ExposureTime"),
    (0x829D, "FNumber"),
    (0x8822, "ExposureProgram"),
    (EXIF_IFD_POINTER, "ExifOffset"),
    (GPS_INFO, "GPSInfo"),
    (ISO_SPEED_RATINGS, "ISOSpeedRatings"),
    (0x9000, "ExifVersion"),
    (0x9003, "DateTimeOriginal"),
    (0x9004, "DateTimeDigitized"),
    (COMPONENTS_CONFIGURATION, "ComponentsConfiguration"),
    (SHUTTER_SPEED_VALUE, "ShutterSpeedValue"),
    (0x9202, "ApertureValue"),
    (0x9203, "BrightnessValue"),
    (0x9205, "MaxApertureValue"),
    (0x9207, "MeteringMode"),
    (0x9209, "Flash"),
    (0x920A, "FocalLength"),
    (MAKER_NOTE, "MakerNote"),
    (0x9290, "SubsecTime"),
    (0x9291, "SubsecTimeOriginal"),
    (0x9292, "SubsecTimeDigitized"),
    (0xA000, "FlashPixVersion"),
    (COLOR_SPACE, "ColorSpace"),
    (EXIF_IMAGE_WIDTH, "ExifImageWidth"),
    (EXIF_IMAGE_HEIGHT, "ExifImageHeight"),
    (INTEROP_IFD_POINTER, "ExifInteroperabilityOffset"),
    (0xA402, "ExposureMode"),
    (0xA403, "WhiteBalance"),
];

/// Display name for a tag id, `Tag0xNNNN` when the id is not in the table.
pub fn tag_name(id: u16) -> String {
    NAMES
        .iter()
        .find(|(tag, _)| *tag == id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Tag{:#06X}", id))
}

/// Resolves a tag dictionary key (numeric id or known name) to an id.
pub fn tag_id(key: &str) -> Option<u16> {
    lookup(key, NAMES)
}

fn lookup(key: &str, names: &[(u16, &str)]) -> Option<u16> {
    let key = key.trim();
    if let Some(hex) = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16).ok();
    }
    key.parse::<u16>().ok().or_else(|| {
        names
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(key))
            .map(|(id, _)| *id)
    })
}
