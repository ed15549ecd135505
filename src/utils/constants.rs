//! Constants Module - Single Source of Truth
//!
//! All constants, unit conversions and static tables used across the bot
//! are defined here. No other module hardcodes endpoints or thresholds.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "Solscope";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = concat!("Solscope/", env!("CARGO_PKG_VERSION"));

// ============================================
// SOLANA CONSTANTS
// ============================================

/// Public mainnet RPC, used when no endpoint is configured
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Base58 alphabet (no 0, I, O, l)
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Minimum length of a base58 encoded address
pub const MIN_ADDRESS_LEN: usize = 32;

/// Maximum length of a base58 encoded address
pub const MAX_ADDRESS_LEN: usize = 44;

/// Regex fragment matching one candidate address
pub const ADDRESS_PATTERN: &str = r"[1-9A-HJ-NP-Za-km-z]{32,44}";

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1e9;

/// Offset of the `decimals` byte in the SPL mint layout
pub const MINT_DECIMALS_OFFSET: usize = 44;

// ============================================
// HOLDER ANALYSIS THRESHOLDS
// ============================================

/// Number of top holders shown and counted as insiders
pub const TOP_HOLDER_COUNT: usize = 5;

/// Number of holders after the largest compared for bundling
pub const BUNDLING_WINDOW: usize = 9;

/// Lower (exclusive) bound of the "near-equal" holding ratio
pub const BUNDLING_RATIO_MIN: f64 = 0.8;

/// Upper (exclusive) bound of the "near-equal" holding ratio
pub const BUNDLING_RATIO_MAX: f64 = 1.2;

/// Score added per near-equal holder
pub const BUNDLING_STEP: f64 = 0.1;

/// Insider percentage above which a token is flagged
pub const INSIDER_FLAG_PERCENT: f64 = 50.0;

/// Bundling score above which a token is flagged
pub const BUNDLING_FLAG_SCORE: f64 = 0.7;

// ============================================
// EXPLORERS
// ============================================

/// Static explorer entry: (name, base display URL, detection regex)
#[derive(Debug, Clone, Copy)]
pub struct ExplorerInfo {
    pub name: &'static str,
    pub base_url: &'static str,
    pub pattern: &'static str,
}

/// Default explorer table. Each pattern must capture the address in group 1.
pub const DEFAULT_EXPLORERS: [ExplorerInfo; 3] = [
    ExplorerInfo {
        name: "Solscan",
        base_url: "https://solscan.io/account/",
        pattern: r"solscan\.io/account/([1-9A-HJ-NP-Za-km-z]{32,44})",
    },
    ExplorerInfo {
        name: "BullX",
        base_url: "https://bullx.io/terminal?chainId=1399811149&address=",
        pattern: r"bullx\.io/terminal\?chainId=1399811149&address=([1-9A-HJ-NP-Za-km-z]{32,44})",
    },
    ExplorerInfo {
        name: "Photon",
        base_url: "https://photon-sol.tinyastro.io/en/lp/",
        pattern: r"photon-sol\.tinyastro\.io/en/lp/([1-9A-HJ-NP-Za-km-z]{32,44})",
    },
];

// ============================================
// DISCORD CONSTANTS
// ============================================

/// Gateway websocket endpoint (API v10, JSON encoding)
pub const DISCORD_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// REST API base
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Gateway intents: GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
pub const DISCORD_INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 15);

/// Default presence text
pub const DEFAULT_STATUS_TEXT: &str = "sol stuff";

/// Default number of messages handled concurrently
pub const DEFAULT_MAX_CONCURRENT_HANDLERS: usize = 32;

// ============================================
// EMBED COLORS
// ============================================

pub const COLOR_WALLET: u32 = 0x00FF00;
pub const COLOR_CONTRACT: u32 = 0x1E88E5;
pub const COLOR_TOKEN: u32 = 0x1E88E5;

// ============================================
// CONVERSION UTILITIES
// ============================================

/// Convert lamports to SOL
#[inline]
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// Check whether a character belongs to the base58 alphabet
#[inline]
pub fn is_base58_char(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}
