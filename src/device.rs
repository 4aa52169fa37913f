//! Command sink interface of the scanner card.
//!
//! The card driver itself lives outside this crate. Each call is one
//! blocking round-trip that either completes or fails.

use std::fmt;

use crate::error::DeviceError;

pub type DeviceResult = std::result::Result<(), DeviceError>;

pub trait CommandSink
{
    fn add_jump_to(&mut self, x: i32, y: i32) -> DeviceResult;
    fn add_line_to(&mut self, x: i32, y: i32) -> DeviceResult;
    fn add_arc_to(&mut self, x: i32, y: i32, angle_degrees: f64) -> DeviceResult;

    fn config_list_memory(&mut self, size: u32, list_id: u32) -> DeviceResult;
    fn init_list_loading(&mut self, list_id: u32) -> DeviceResult;
    fn set_end_of_list(&mut self) -> DeviceResult;
    fn execute_list(&mut self, list_id: u32) -> DeviceResult;

    fn set_scanner_delays(&mut self, jump: u32, mark: u32, polygon: u32) -> DeviceResult;
    fn set_mark_speed(&mut self, speed: f64) -> DeviceResult;
    fn set_jump_speed(&mut self, speed: f64) -> DeviceResult;
    fn set_laser_pulses(&mut self, half_period: u32, pulse_length: u32) -> DeviceResult;
    fn set_firstpulse_killer(&mut self, length: u32) -> DeviceResult;
    fn set_wobbel_mode(&mut self, transversal: u32, longitudinal: u32,
                       freq: f64, mode: i32) -> DeviceResult;
    fn set_sky_writing_para_list(&mut self, timelag: f64, laser_on_shift: i32,
                                 nprev: u32, npost: u32) -> DeviceResult;
    fn set_sky_writing_mode(&mut self, mode: u32) -> DeviceResult;
    fn set_angle_list(&mut self, angle_degrees: f64) -> DeviceResult;
    fn set_scanahead_autodelays(&mut self, enable: bool) -> DeviceResult;
    fn set_scanahead_laser_shifts(&mut self, laser_on: i32, laser_off: i32) -> DeviceResult;
    fn set_scanahead_line_params(&mut self, corner_scale: f64, end_scale: f64,
                                 acc_scale: f64) -> DeviceResult;
}

impl<'a, T: CommandSink + ?Sized> CommandSink for &'a mut T
{
    fn add_jump_to(&mut self, x: i32, y: i32) -> DeviceResult {
        (**self).add_jump_to(x, y)
    }
    fn add_line_to(&mut self, x: i32, y: i32) -> DeviceResult {
        (**self).add_line_to(x, y)
    }
    fn add_arc_to(&mut self, x: i32, y: i32, angle_degrees: f64) -> DeviceResult {
        (**self).add_arc_to(x, y, angle_degrees)
    }
    fn config_list_memory(&mut self, size: u32, list_id: u32) -> DeviceResult {
        (**self).config_list_memory(size, list_id)
    }
    fn init_list_loading(&mut self, list_id: u32) -> DeviceResult {
        (**self).init_list_loading(list_id)
    }
    fn set_end_of_list(&mut self) -> DeviceResult {
        (**self).set_end_of_list()
    }
    fn execute_list(&mut self, list_id: u32) -> DeviceResult {
        (**self).execute_list(list_id)
    }
    fn set_scanner_delays(&mut self, jump: u32, mark: u32, polygon: u32) -> DeviceResult {
        (**self).set_scanner_delays(jump, mark, polygon)
    }
    fn set_mark_speed(&mut self, speed: f64) -> DeviceResult {
        (**self).set_mark_speed(speed)
    }
    fn set_jump_speed(&mut self, speed: f64) -> DeviceResult {
        (**self).set_jump_speed(speed)
    }
    fn set_laser_pulses(&mut self, half_period: u32, pulse_length: u32) -> DeviceResult {
        (**self).set_laser_pulses(half_period, pulse_length)
    }
    fn set_firstpulse_killer(&mut self, length: u32) -> DeviceResult {
        (**self).set_firstpulse_killer(length)
    }
    fn set_wobbel_mode(&mut self, transversal: u32, longitudinal: u32,
                       freq: f64, mode: i32) -> DeviceResult {
        (**self).set_wobbel_mode(transversal, longitudinal, freq, mode)
    }
    fn set_sky_writing_para_list(&mut self, timelag: f64, laser_on_shift: i32,
                                 nprev: u32, npost: u32) -> DeviceResult {
        (**self).set_sky_writing_para_list(timelag, laser_on_shift, nprev, npost)
    }
    fn set_sky_writing_mode(&mut self, mode: u32) -> DeviceResult {
        (**self).set_sky_writing_mode(mode)
    }
    fn set_angle_list(&mut self, angle_degrees: f64) -> DeviceResult {
        (**self).set_angle_list(angle_degrees)
    }
    fn set_scanahead_autodelays(&mut self, enable: bool) -> DeviceResult {
        (**self).set_scanahead_autodelays(enable)
    }
    fn set_scanahead_laser_shifts(&mut self, laser_on: i32, laser_off: i32) -> DeviceResult {
        (**self).set_scanahead_laser_shifts(laser_on, laser_off)
    }
    fn set_scanahead_line_params(&mut self, corner_scale: f64, end_scale: f64,
                                 acc_scale: f64) -> DeviceResult {
        (**self).set_scanahead_line_params(corner_scale, end_scale, acc_scale)
    }
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall
{
    AddJumpTo(i32, i32),
    AddLineTo(i32, i32),
    AddArcTo(i32, i32, f64),
    ConfigListMemory(u32, u32), // size, list id
    InitListLoading(u32),
    SetEndOfList,
    ExecuteList(u32),
    SetScannerDelays(u32, u32, u32),
    SetMarkSpeed(f64),
    SetJumpSpeed(f64),
    SetLaserPulses(u32, u32),
    SetFirstpulseKiller(u32),
    SetWobbelMode(u32, u32, f64, i32),
    SetSkyWritingParaList(f64, i32, u32, u32),
    SetSkyWritingMode(u32),
    SetAngleList(f64),
    SetScanaheadAutodelays(bool),
    SetScanaheadLaserShifts(i32, i32),
    SetScanaheadLineParams(f64, f64, f64)
}

impl DeviceCall
{
    pub fn is_list_command(&self) -> bool
    {
        matches!(self, DeviceCall::AddJumpTo(..) | DeviceCall::AddLineTo(..)
                 | DeviceCall::AddArcTo(..))
    }
}

impl fmt::Display for DeviceCall
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            DeviceCall::AddJumpTo(x, y) => write!(f, "add_jump_to({}, {})", x, y),
            DeviceCall::AddLineTo(x, y) => write!(f, "add_line_to({}, {})", x, y),
            DeviceCall::AddArcTo(x, y, a) => write!(f, "add_arc_to({}, {}, {})", x, y, a),
            DeviceCall::ConfigListMemory(s, id) => write!(f, "config_list_memory({}, {})", s, id),
            DeviceCall::InitListLoading(id) => write!(f, "init_list_loading({})", id),
            DeviceCall::SetEndOfList => write!(f, "set_end_of_list()"),
            DeviceCall::ExecuteList(id) => write!(f, "execute_list({})", id),
            DeviceCall::SetScannerDelays(j, m, p) =>
                write!(f, "set_scanner_delays({}, {}, {})", j, m, p),
            DeviceCall::SetMarkSpeed(v) => write!(f, "set_mark_speed({})", v),
            DeviceCall::SetJumpSpeed(v) => write!(f, "set_jump_speed({})", v),
            DeviceCall::SetLaserPulses(h, l) => write!(f, "set_laser_pulses({}, {})", h, l),
            DeviceCall::SetFirstpulseKiller(l) => write!(f, "set_firstpulse_killer({})", l),
            DeviceCall::SetWobbelMode(t, l, fr, m) =>
                write!(f, "set_wobbel_mode({}, {}, {}, {})", t, l, fr, m),
            DeviceCall::SetSkyWritingParaList(t, s, p, n) =>
                write!(f, "set_sky_writing_para_list({}, {}, {}, {})", t, s, p, n),
            DeviceCall::SetSkyWritingMode(m) => write!(f, "set_sky_writing_mode({})", m),
            DeviceCall::SetAngleList(a) => write!(f, "set_angle_list({})", a),
            DeviceCall::SetScanaheadAutodelays(e) =>
                write!(f, "set_scanahead_autodelays({})", e),
            DeviceCall::SetScanaheadLaserShifts(on, off) =>
                write!(f, "set_scanahead_laser_shifts({}, {})", on, off),
            DeviceCall::SetScanaheadLineParams(c, e, a) =>
                write!(f, "set_scanahead_line_params({}, {}, {})", c, e, a)
        }
    }
}

/// Sink that only records what it is asked to do. Optionally fails the
/// n-th call (counting from 0) to simulate a device error.
#[derive(Debug, Default)]
pub struct RecordingSink
{
    calls: Vec<DeviceCall>,
    fail_at: Option<usize>,
    attempts: usize
}

impl RecordingSink
{
    pub fn new() -> RecordingSink
    {
        RecordingSink::default()
    }

    pub fn failing_at(call_index: usize) -> RecordingSink
    {
        RecordingSink {fail_at: Some(call_index), .. RecordingSink::default()}
    }

    pub fn calls(&self) -> &[DeviceCall]
    {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DeviceCall>
    {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: DeviceCall) -> DeviceResult
    {
        let n = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(n) {
            return Err(DeviceError::new(format!("simulated failure of {}", call)));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl CommandSink for RecordingSink
{
    fn add_jump_to(&mut self, x: i32, y: i32) -> DeviceResult {
        self.record(DeviceCall::AddJumpTo(x, y))
    }
    fn add_line_to(&mut self, x: i32, y: i32) -> DeviceResult {
        self.record(DeviceCall::AddLineTo(x, y))
    }
    fn add_arc_to(&mut self, x: i32, y: i32, angle_degrees: f64) -> DeviceResult {
        self.record(DeviceCall::AddArcTo(x, y, angle_degrees))
    }
    fn config_list_memory(&mut self, size: u32, list_id: u32) -> DeviceResult {
        self.record(DeviceCall::ConfigListMemory(size, list_id))
    }
    fn init_list_loading(&mut self, list_id: u32) -> DeviceResult {
        self.record(DeviceCall::InitListLoading(list_id))
    }
    fn set_end_of_list(&mut self) -> DeviceResult {
        self.record(DeviceCall::SetEndOfList)
    }
    fn execute_list(&mut self, list_id: u32) -> DeviceResult {
        self.record(DeviceCall::ExecuteList(list_id))
    }
    fn set_scanner_delays(&mut self, jump: u32, mark: u32, polygon: u32) -> DeviceResult {
        self.record(DeviceCall::SetScannerDelays(jump, mark, polygon))
    }
    fn set_mark_speed(&mut self, speed: f64) -> DeviceResult {
        self.record(DeviceCall::SetMarkSpeed(speed))
    }
    fn set_jump_speed(&mut self, speed: f64) -> DeviceResult {
        self.record(DeviceCall::SetJumpSpeed(speed))
    }
    fn set_laser_pulses(&mut self, half_period: u32, pulse_length: u32) -> DeviceResult {
        self.record(DeviceCall::SetLaserPulses(half_period, pulse_length))
    }
    fn set_firstpulse_killer(&mut self, length: u32) -> DeviceResult {
        self.record(DeviceCall::SetFirstpulseKiller(length))
    }
    fn set_wobbel_mode(&mut self, transversal: u32, longitudinal: u32,
                       freq: f64, mode: i32) -> DeviceResult {
        self.record(DeviceCall::SetWobbelMode(transversal, longitudinal, freq, mode))
    }
    fn set_sky_writing_para_list(&mut self, timelag: f64, laser_on_shift: i32,
                                 nprev: u32, npost: u32) -> DeviceResult {
        self.record(DeviceCall::SetSkyWritingParaList(timelag, laser_on_shift,
                                                      nprev, npost))
    }
    fn set_sky_writing_mode(&mut self, mode: u32) -> DeviceResult {
        self.record(DeviceCall::SetSkyWritingMode(mode))
    }
    fn set_angle_list(&mut self, angle_degrees: f64) -> DeviceResult {
        self.record(DeviceCall::SetAngleList(angle_degrees))
    }
    fn set_scanahead_autodelays(&mut self, enable: bool) -> DeviceResult {
        self.record(DeviceCall::SetScanaheadAutodelays(enable))
    }
    fn set_scanahead_laser_shifts(&mut self, laser_on: i32, laser_off: i32) -> DeviceResult {
        self.record(DeviceCall::SetScanaheadLaserShifts(laser_on, laser_off))
    }
    fn set_scanahead_line_params(&mut self, corner_scale: f64, end_scale: f64,
                                 acc_scale: f64) -> DeviceResult {
        self.record(DeviceCall::SetScanaheadLineParams(corner_scale, end_scale,
                                                       acc_scale))
    }
}
