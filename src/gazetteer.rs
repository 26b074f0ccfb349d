// Gazetteer - place tables as data
// Maps Korean place-name tokens to base coordinates and coarse region
// buckets. Tables are priority-ordered: fine neighborhoods win over coarse
// districts, and earlier entries win inside one table.
//
// Known limitation: all lookups are plain substring checks ("does key K
// appear anywhere in the text"), not word-boundary matches, so a short place
// name nested inside an unrelated longer token produces a false positive.
// Downstream visual grouping depends on this behavior; do not tighten it
// without a product decision.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// COORDINATE
// ============================================================================

/// Latitude/longitude pair. Coordinates here are approximate cluster
/// anchors, not survey-grade positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// Bit-exact key for grouping markers by coordinate equality.
    pub fn grouping_key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}

/// Fallback anchor when nothing matches: Seoul city hall.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(37.5665, 126.9780);

/// Catch-all region bucket.
pub const REGION_OTHER: &str = "기타";

/// Sentinel city label when no place table entry matches.
pub const CITY_UNCLASSIFIED: &str = "미분류(서울)";

// ============================================================================
// BUILTIN TABLES
// ============================================================================

// Fine-grained neighborhoods and landmarks, checked before the district
// table. Entry order is match priority.
const FINE_PLACES: &[(&str, f64, f64)] = &[
    ("반추", 37.5156, 126.8950), ("반추정보통신", 37.5156, 126.8950),
    ("신도림TM", 37.5087, 126.8905), ("테크노", 37.5351, 127.0957), ("강변TM", 37.5351, 127.0957),
    ("신원", 37.6744, 126.8653), ("화정", 37.6346, 126.8326), ("성사", 37.6533, 126.8430),
    ("삼송", 37.6530, 126.8950), ("원흥", 37.6500, 126.8730), ("배곧", 37.3705, 126.7335),
    ("정왕", 37.3450, 126.7400), ("은행", 37.4360, 126.7970), ("상동", 37.5050, 126.7530),
    ("중동", 37.5020, 126.7640), ("소사", 37.4830, 126.7940), ("풍무", 37.6030, 126.7230),
    ("사우", 37.6190, 126.7190), ("구래", 37.6450, 126.6280), ("철산", 37.4760, 126.8680),
    ("하안", 37.4550, 126.8810), ("우만", 37.2913, 127.0396), ("동탄", 37.2005, 127.0976),
    ("병점", 37.2070, 127.0330), ("봉담", 37.2160, 126.9450), ("향남", 37.1320, 126.9210),
    ("장당", 37.0468, 127.0607), ("송탄", 37.0820, 127.0570), ("안중", 36.9930, 126.9310),
    ("팽성", 36.9580, 127.0520), ("공도", 37.0010, 127.1720), ("대천", 37.0160, 127.2660),
    ("판교", 37.3956, 127.1112), ("야탑", 37.4110, 127.1280), ("위례", 37.4787, 127.1458),
    ("죽전", 37.3240, 127.1070), ("미사", 37.5640, 127.1940), ("경안", 37.4090, 127.2570),
    ("태전", 37.3940, 127.2280), ("홍문", 37.2960, 127.6365), ("민락", 37.7470, 127.0990),
    ("지행", 37.8935, 127.0545), ("옥정", 37.8220, 127.0960), ("덕정", 37.8420, 127.0620),
    ("다산", 37.6230, 127.1570), ("별내", 37.6440, 127.1150), ("호평", 37.6550, 127.2430),
    ("양수", 37.5452, 127.3276), ("운정", 37.7160, 126.7450), ("문산", 37.8550, 126.7940),
    ("전곡", 38.0260, 127.0660), ("원통", 38.1326, 128.2036), ("인제", 38.0697, 128.1703),
    ("송도", 37.3947, 126.6393), ("청라", 37.5384, 126.6337), ("구월", 37.4490, 126.7050),
    ("주안", 37.4650, 126.6800), ("검단", 37.5930, 126.6740), ("여의도", 37.5219, 126.9242),
    ("잠실", 37.5132, 127.1000), ("천호", 37.5436, 127.1255), ("홍대", 37.5575, 126.9245),
    ("신촌", 37.5598, 126.9425), ("합정", 37.5484, 126.9137), ("연신내", 37.6186, 126.9207),
    ("수색", 37.5802, 126.8958), ("이태원", 37.5345, 126.9940), ("청파", 37.5447, 126.9678),
    ("혜화", 37.5820, 127.0010), ("군자", 37.5571, 127.0794), ("아차산", 37.5520, 127.0890),
    ("성수", 37.5445, 127.0559), ("왕십리", 37.5619, 127.0384), ("상봉", 37.5954, 127.0858),
    ("수유", 37.6370, 127.0250), ("창동", 37.6530, 127.0470), ("서부물류", 37.5113, 126.8373),
    ("장항", 37.6629, 126.7697), ("봉일", 37.7550, 126.0815),
];

// Districts and cities, checked after the fine table.
const COARSE_PLACES: &[(&str, f64, f64)] = &[
    ("강남", 37.5172, 127.0473), ("서초", 37.4837, 127.0324), ("송파", 37.5145, 127.1066),
    ("강동", 37.5301, 127.1238), ("영등포", 37.5264, 126.8962), ("마포", 37.5663, 126.9016),
    ("용산", 37.5326, 126.9645), ("종로", 37.5729, 126.9791), ("중구", 37.5637, 126.9975),
    ("성동", 37.5633, 127.0371), ("광진", 37.5385, 127.0823), ("동대문", 37.5714, 127.0097),
    ("성북", 37.5891, 127.0182), ("강북", 37.6396, 127.0257), ("도봉", 37.6688, 127.0471),
    ("노원", 37.6542, 127.0568), ("은평", 37.6027, 126.9291), ("서대문", 37.5791, 126.9368),
    ("양천", 37.5169, 126.8665), ("강서", 37.5509, 126.8495), ("구로", 37.4954, 126.8874),
    ("금천", 37.4573, 126.8964), ("동작", 37.5124, 126.9393), ("관악", 37.4784, 126.9516),
    ("중랑", 37.6065, 127.0927),
    ("수원", 37.2636, 127.0286), ("성남", 37.4200, 127.1265), ("의정부", 37.7381, 127.0337),
    ("안양", 37.3943, 126.9568), ("부천", 37.5034, 126.7660), ("광명", 37.4786, 126.8646),
    ("평택", 36.9925, 127.1127), ("동두천", 37.9036, 127.0604), ("안산", 37.3219, 126.8309),
    ("고양", 37.6584, 126.8320), ("과천", 37.4292, 126.9877), ("구리", 37.6033, 127.1436),
    ("남양주", 37.6360, 127.2165), ("오산", 37.1498, 127.0772), ("시흥", 37.3801, 126.8029),
    ("군포", 37.3614, 126.9351), ("의왕", 37.3447, 126.9739), ("하남", 37.5393, 127.2149),
    ("용인", 37.2410, 127.1775), ("파주", 37.7600, 126.7800), ("이천", 37.2811, 127.4358),
    ("안성", 37.0080, 127.2797), ("김포", 37.6153, 126.7157), ("화성", 37.1995, 126.8315),
    ("광주", 37.4294, 127.2550), ("양주", 37.7853, 127.0458), ("포천", 37.8949, 127.2003),
    ("여주", 37.2983, 127.6370), ("연천", 38.0964, 127.0749), ("가평", 37.8315, 127.5095),
    ("양평", 37.4912, 127.4876), ("인천", 37.4563, 126.7052),
    ("춘천", 37.8813, 127.7298), ("원주", 37.3422, 127.9202), ("강릉", 37.7519, 128.8760),
    ("장안", 37.3036, 126.9745), ("권선", 37.2575, 126.9715), ("팔달", 37.2798, 127.0441),
    ("영통", 37.2511, 127.0709),
    ("수정", 37.4500, 127.1400), ("중원", 37.4300, 127.1700), ("분당", 37.3827, 127.1189),
    ("만안", 37.4000, 126.9200), ("동안", 37.3900, 126.9600),
    ("덕양", 37.6380, 126.8330), ("일산동", 37.6600, 126.7700), ("일산서", 37.6700, 126.7500),
    ("처인", 37.2300, 127.2000), ("기흥", 37.2655, 127.1293), ("수지", 37.3223, 127.0975),
    ("일산", 37.6584, 126.8320),
];

// Region labels that short-circuit classification when they appear
// literally in the holder text.
const EXPLICIT_REGIONS: &[&str] = &[
    "강변TM", "신도림TM", "동남", "동북", "서남", "서북", "남부", "강원", "인천",
];

// Region bucket -> place keywords, checked after the explicit labels.
const REGION_KEYWORDS: &[(&str, &[&str])] = &[
    ("동남", &[
        "강남", "서초", "송파", "강동", "잠실", "천호", "위례", "하남", "미사",
        "성남", "수정", "중원", "분당", "판교", "야탑", "용인", "수지", "기흥",
        "처인", "죽전", "광주", "경안", "태전", "이천", "여주", "홍문", "양평", "양수",
    ]),
    ("동북", &[
        "성동", "성수", "왕십리", "광진", "군자", "아차산", "테크노", "동대문",
        "중랑", "상봉", "성북", "강북", "수유", "도봉", "창동", "노원", "혜화",
        "의정부", "민락", "구리", "남양주", "다산", "별내", "호평", "양주", "옥정",
        "덕정", "동두천", "지행", "포천", "연천", "전곡", "가평",
    ]),
    ("서남", &[
        "영등포", "여의도", "구로", "금천", "양천", "강서", "동작", "관악",
        "광명", "철산", "하안", "부천", "상동", "중동", "소사", "안양", "만안",
        "동안", "안산", "시흥", "배곧", "정왕", "은행", "군포", "의왕", "과천",
        "서부물류",
    ]),
    ("서북", &[
        "마포", "홍대", "신촌", "합정", "서대문", "은평", "연신내", "수색",
        "종로", "중구", "용산", "이태원", "청파", "고양", "덕양", "일산", "화정",
        "성사", "삼송", "원흥", "신원", "장항", "파주", "운정", "문산", "김포",
        "풍무", "사우", "구래", "봉일",
    ]),
    ("남부", &[
        "수원", "장안", "권선", "팔달", "영통", "우만", "화성", "동탄", "병점",
        "봉담", "향남", "오산", "평택", "장당", "송탄", "안중", "팽성", "안성",
        "공도", "대천",
    ]),
    ("강원", &["춘천", "원주", "강릉", "원통", "인제"]),
    ("인천", &["송도", "청라", "구월", "주안", "검단"]),
];

// ============================================================================
// TABLE TYPES
// ============================================================================

/// One place table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl PlaceEntry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// One region bucket with its place keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRule {
    pub region: String,
    pub keywords: Vec<String>,
}

// ============================================================================
// GAZETTEER
// ============================================================================

/// Read-only lookup tables for base coordinates, regions and city labels.
///
/// Table versions are data, not code: `builtin()` carries the tables the
/// dashboard ships with, `from_file` swaps in a JSON-defined version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gazetteer {
    fine: Vec<PlaceEntry>,
    coarse: Vec<PlaceEntry>,
    explicit_regions: Vec<String>,
    region_rules: Vec<RegionRule>,
}

impl Gazetteer {
    /// Gazetteer with the builtin Seoul/Gyeonggi tables.
    pub fn builtin() -> Self {
        let place = |&(name, lat, lon): &(&str, f64, f64)| PlaceEntry {
            name: name.to_string(),
            lat,
            lon,
        };

        Gazetteer {
            fine: FINE_PLACES.iter().map(place).collect(),
            coarse: COARSE_PLACES.iter().map(place).collect(),
            explicit_regions: EXPLICIT_REGIONS.iter().map(|s| s.to_string()).collect(),
            region_rules: REGION_KEYWORDS
                .iter()
                .map(|&(region, keywords)| RegionRule {
                    region: region.to_string(),
                    keywords: keywords.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Load a gazetteer table version from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read gazetteer file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse gazetteer JSON")
    }

    /// Base coordinate for a holder text: first fine match, then first
    /// coarse match, else the default city center.
    pub fn lookup_base_coordinate(&self, text: &str) -> Coordinate {
        self.find_place(text)
            .map(PlaceEntry::coordinate)
            .unwrap_or(DEFAULT_CENTER)
    }

    /// Coarse region bucket for a holder text.
    ///
    /// Explicit region labels appearing literally in the text win outright;
    /// otherwise the first region whose keyword set has a substring match.
    pub fn lookup_region(&self, text: &str) -> String {
        for label in &self.explicit_regions {
            if text.contains(label.as_str()) {
                return label.clone();
            }
        }

        for rule in &self.region_rules {
            if rule.keywords.iter().any(|k| text.contains(k.as_str())) {
                return rule.region.clone();
            }
        }

        REGION_OTHER.to_string()
    }

    /// City/neighborhood label for a holder text, or the unclassified
    /// sentinel.
    pub fn lookup_city(&self, text: &str) -> String {
        self.find_place(text)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| CITY_UNCLASSIFIED.to_string())
    }

    /// Fine entries first, then coarse; first substring hit wins.
    fn find_place(&self, text: &str) -> Option<&PlaceEntry> {
        self.fine
            .iter()
            .chain(self.coarse.iter())
            .find(|p| text.contains(p.name.as_str()))
    }

    pub fn fine_count(&self) -> usize {
        self.fine.len()
    }

    pub fn coarse_count(&self) -> usize {
        self.coarse.len()
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// TESTS
// ============================================================================
