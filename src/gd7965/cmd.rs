pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    // Setup
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_SETTING: u8 = 0x01;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_OFF_SEQUENCE: u8 = 0x03;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const DEEP_SLEEP: u8 = 0x07;

    // Frame
    pub const START_TRANSMISSION_1: u8 = 0x10; // black/white plane
    pub const DATA_STOP: u8 = 0x11;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const START_TRANSMISSION_2: u8 = 0x13; // red plane

    // Timing and geometry
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const TCON: u8 = 0x60;
    pub const RESOLUTION: u8 = 0x61;
    pub const GATE_SOURCE_START: u8 = 0x65;

    // Status
    pub const REVISION: u8 = 0x70;
    pub const GET_STATUS: u8 = 0x71;

    // Partial window
    pub const PARTIAL_WINDOW: u8 = 0x90;
    pub const PARTIAL_IN: u8 = 0x91;
    pub const PARTIAL_OUT: u8 = 0x92;
}

/*
Datasheet registers not driven by this firmware:
0x05 - Power ON Measure
0x15 - Dual SPI
0x17 - Auto Sequence
0x2A - LUT option
0x30 - PLL control
0x40..0x44 - Temperature sensor / panel break check
0x51 - Lower Power Detection
0x80..0x82 - VCOM measurement and DC setting
0xA0..0xA2 - OTP programming
0xE0..0xE7 - Cascade, power saving, LVD, temperature boundary
*/
