/// Register payloads and constants used by the GD7965 bring-up sequence.
///
/// These bytes are the protocol contract with the panel; change them only
/// together with the panel datasheet.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Revision (0x70): 7 bytes are read back, the last one is the chip revision
    pub const REVISION_LEN: usize = 7;
    pub const REVISION_CODE: u8 = 0x0C;

    // Power Setting (0x01)
    // Border LDO disabled, VD and VG generated from DC/DC
    // OTP power from VPP pin, slow slew rate, VGH=20V, VGL=-20V
    // VDH=15V, VDL=-15V
    pub const POWER_SETTING: [u8; 4] = [0x07, 0x07, 0x3F, 0x3F];

    // Panel Setting (0x00): LUT from OTP, KWR mode, scan up, shift right, booster on
    pub const PANEL_SETTING_KWR: [u8; 1] = [0x0F];

    // VCOM and data interval (0x50)
    // Border output Hi-Z disabled, no border LUT copy; VCOM/data interval 10 hsync
    pub const VCOM_DATA_INTERVAL: [u8; 2] = [0x11, 0x07];

    // TCON (0x60): source/gate non-overlap period 12
    pub const TCON_NON_OVERLAP: [u8; 1] = [0x22];

    // Gate/Source start (0x65): HSTART=0, VSTART=0
    pub const GATE_SOURCE_ORIGIN: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

    // Deep Sleep (0x07): the command is ignored unless followed by this byte
    pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

    // Plane bytes
    pub const PLANE_ALL_WHITE: u8 = 0xFF;
    pub const PLANE_NO_RED: u8 = 0x00;
}
