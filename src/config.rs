// HomeWatch — Hardware & System Configuration
// Target: ESP32 DevKitC (Xtensa)

use crate::hal::Tick;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 21; // I2C data line (OLED + sensors + LED array)
pub const PIN_I2C_SCL: i32 = 22; // I2C clock line
pub const PIN_UART_TX: i32 = 17; // Telemetry out
pub const PIN_UART_RX: i32 = 16; // Unused, reserved by the UART peripheral
pub const PIN_ROTARY_A: i32 = 32; // Rotary encoder channel A (rising edge)
pub const PIN_ROTARY_B: i32 = 33; // Rotary encoder channel B (rising edge)
pub const PIN_NAV_UP: i32 = 34; // Directional buttons (active LOW, ext. pull-up)
pub const PIN_NAV_DOWN: i32 = 35;
pub const PIN_NAV_LEFT: i32 = 36;
pub const PIN_NAV_RIGHT: i32 = 39;
pub const PIN_NAV_CENTER: i32 = 25;
pub const PIN_MODE_SWITCH: i32 = 26; // Passive/Monitor toggle (active LOW)
pub const PIN_LIGHT_ALARM: i32 = 27; // ISL29003 interrupt output (active LOW)
pub const PIN_SIREN: i32 = 13; // Piezo siren drive
pub const PIN_LED_RED: i32 = 14; // Over-temperature indicator
pub const PIN_LED_BLUE: i32 = 12; // Motion-in-darkness indicator
pub const PIN_LED_AUX: i32 = 15; // Auxiliary lamp paired with the LED array
pub const PIN_SSEG_SCLK: i32 = 18; // 7-segment shift register clock
pub const PIN_SSEG_MOSI: i32 = 23; // 7-segment shift register data
pub const PIN_SSEG_CS: i32 = 5; // 7-segment shift register latch

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_ADDR_LIGHT: u8 = 0x44; // ISL29003
pub const I2C_ADDR_ACCEL: u8 = 0x1D; // MMA7455
pub const I2C_ADDR_TEMP: u8 = 0x48; // LM75
pub const I2C_ADDR_LED_ARRAY: u8 = 0x60; // PCA9532
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024
pub const DETAIL_FONT_SIZE: u8 = 2; // Large font for the single-value pages

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_INPUT: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (ticks == milliseconds)
// ---------------------------------------------------------------------------
pub const FAST_TICK_MS: u64 = 333; // Indicator blink cadence
pub const SLOW_TICK_MS: u64 = 1000; // Status digit / sampling cadence
pub const LOOP_IDLE_MS: u64 = 5; // Sleep between cooperative passes
pub const AUX_REFRESH_TICKS: Tick = 100; // Temp/accel refresh between samples
pub const MOTION_HOLD_TICKS: Tick = 20; // Motion-free window before auto-clear

// ---------------------------------------------------------------------------
// Navigation Debounce
// ---------------------------------------------------------------------------
pub const PAGE_CHANGE_COOLDOWN_TICKS: Tick = 500; // Buttons and anti-clockwise rotary
pub const PAGE_CHANGE_COOLDOWN_CW_TICKS: Tick = 2 * PAGE_CHANGE_COOLDOWN_TICKS; // Clockwise rotary
pub const ROTARY_CONFIRM_COUNT: u8 = 10; // Navigation fires above this run length

// ---------------------------------------------------------------------------
// Status Digit (7-segment hex cycle)
// ---------------------------------------------------------------------------
pub const DIGIT_GLYPHS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
];
pub const SAMPLE_PHASES: [usize; 3] = [5, 10, 15]; // Digit steps that trigger a sample
pub const TELEMETRY_PHASE: usize = 15; // Digit step that triggers a transmission

// ---------------------------------------------------------------------------
// Alert Thresholds
// ---------------------------------------------------------------------------
pub const TEMP_ALERT_THRESHOLD: i32 = 450; // Tenths of a degree (45.0 C)
pub const MOTION_DELTA: i16 = 5; // Per-axis acceleration delta that counts as motion

// Light-sensor alarm windows: the alarm fires when the reading leaves
// [lo, hi], so the armed window selects which transition is detected next.
pub const DARKNESS_ARM_LO: u32 = 50; // Armed while lit: fire on light < 50
pub const DARKNESS_ARM_HI: u32 = 972;
pub const LIGHT_ARM_LO: u32 = 0; // Armed while dark: fire on light > 50
pub const LIGHT_ARM_HI: u32 = 50;

// ---------------------------------------------------------------------------
// Outputs & Identity
// ---------------------------------------------------------------------------
pub const LED_ARRAY_LIT_PATTERN: u16 = 0xAAAA; // Alternating lamps pattern
pub const LED_ARRAY_ALL_MASK: u16 = 0xFFFF;
pub const USER_ID: &str = "HOMEWATCH-01"; // Identifier in assistance requests
