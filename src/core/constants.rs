pub const DEFAULT_BASE_URL: &str = "https://api.aftership.com";
pub const DEFAULT_API_VERSION: &str = "2025-01";
pub const SUPPORTED_API_VERSIONS: &[&str] = &["2025-01", "2024-10", "2024-07", "2024-04"];

pub const TRACKING_PATH: &str = "/tracking";
pub const SHIPPING_PATH: &str = "/postmen/v3";
pub const RETURNS_PATH: &str = "/returns";

pub const API_KEY_HEADER: &str = "as-api-key";
pub const SIGNATURE_HEADER: &str = "aftership-hmac-sha256";

pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const MAX_PAGES: u64 = 1000;

pub const DEFAULT_LIST_LIMIT: u64 = 50;

/// `(name, slug)` pairs offered when the courier list cannot be fetched.
pub const POPULAR_COURIERS: &[(&str, &str)] = &[
    ("FedEx", "fedex"),
    ("UPS", "ups"),
    ("USPS", "usps"),
    ("DHL Express", "dhl"),
    ("DHL eCommerce", "dhl-ecommerce"),
    ("Amazon Logistics", "amazon-fba-us"),
    ("Canada Post", "canada-post"),
    ("Royal Mail", "royal-mail"),
    ("Australia Post", "australia-post"),
    ("China Post", "china-post"),
    ("Japan Post", "japan-post"),
    ("La Poste", "france-post"),
    ("Deutsche Post", "deutsche-post"),
    ("TNT", "tnt"),
    ("Aramex", "aramex"),
    ("SF Express", "sf-express"),
    ("YTO Express", "yto"),
    ("Cainiao", "cainiao"),
    ("PostNL", "postnl"),
    ("Swiss Post", "swiss-post"),
];
pub const MIN_LIST_LIMIT: u64 = 1;
pub const MAX_LIST_LIMIT: u64 = 200;

/// Response keys that hold a page of results inside `data`.
pub const COLLECTION_KEYS: &[&str] = &[
    "trackings",
    "returns",
    "orders",
    "shipments",
    "shipper_accounts",
];

pub const DELIVERY_STATUSES: &[&str] = &[
    "Pending",
    "InfoReceived",
    "InTransit",
    "OutForDelivery",
    "AttemptFail",
    "Delivered",
    "AvailableForPickup",
    "Exception",
    "Expired",
];

pub const COMPLETION_REASONS: &[&str] = &["DELIVERED", "LOST", "RETURNED_TO_SENDER"];

pub const RETURN_STATUSES: &[&str] = &[
    "pending",
    "approved",
    "rejected",
    "in_transit",
    "received",
    "completed",
    "cancelled",
];

pub const SHIPMENT_STATUSES: &[&str] = &["created", "pending", "manifested", "failed", "voided"];

pub const PAPER_SIZES: &[&str] = &["4x6", "4x8", "a4", "letter"];
