//! List programming of the scanner card.
//!
//! The card takes a list in four steps: open the list for loading, append
//! commands, close it and start it. [`ListProtocolDriver`] tracks where in
//! that sequence it is and refuses calls that do not belong there, before
//! anything reaches the card. Each call waits for the card to acknowledge.
//!
//! A session that is abandoned after `begin_load` leaves a partially loaded
//! list in the card. Nothing here tries to clean that up.

use std::fmt;

use log::{debug, info};

use crate::device::CommandSink;
use crate::error::{Error, Result};
use crate::execution_list::ExecutionListConfig;
use crate::path_command::{PathCommand, Shape};

pub const DEFAULT_LIST_ID: u32 = 1;
pub const DEFAULT_LIST_MEMORY: u32 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSession
{
    Idle,
    Loading,
    Loaded
}

impl fmt::Display for ListSession
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        let s = match self {
            ListSession::Idle => "idle",
            ListSession::Loading => "loading",
            ListSession::Loaded => "loaded"
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig
{
    pub list_id: u32,
    pub list_memory: u32 // entries
}

impl Default for ListConfig
{
    fn default() -> ListConfig {
        ListConfig {list_id: DEFAULT_LIST_ID, list_memory: DEFAULT_LIST_MEMORY}
    }
}

impl ListConfig
{
    /// Commands that fit in one list, leaving room for the end marker.
    pub fn capacity(&self) -> usize
    {
        (self.list_memory as usize).saturating_sub(1)
    }
}

pub struct ListProtocolDriver<S: CommandSink>
{
    sink: S,
    list: ListConfig,
    state: ListSession,
    loaded: usize
}

impl<S: CommandSink> ListProtocolDriver<S>
{
    pub fn new(sink: S) -> ListProtocolDriver<S>
    {
        ListProtocolDriver::with_list_config(sink, ListConfig::default())
    }

    pub fn with_list_config(sink: S, list: ListConfig) -> ListProtocolDriver<S>
    {
        ListProtocolDriver {
            sink,
            list,
            state: ListSession::Idle,
            loaded: 0
        }
    }

    pub fn state(&self) -> ListSession
    {
        self.state
    }

    pub fn list_config(&self) -> &ListConfig
    {
        &self.list
    }

    pub fn sink(&self) -> &S
    {
        &self.sink
    }

    pub fn into_sink(self) -> S
    {
        self.sink
    }

    fn require(&self, operation: &'static str, expected: ListSession) -> Result<()>
    {
        if self.state != expected {
            return Err(Error::ProtocolViolation {operation, state: self.state});
        }
        Ok(())
    }

    /// Pushes every scanner and laser setting to the card. Only allowed
    /// between lists.
    pub fn apply_config(&mut self, config: &ExecutionListConfig) -> Result<()>
    {
        self.require("apply_config", ListSession::Idle)?;
        debug!("Applying {:?}", config);
        let s = &mut self.sink;
        let d = &config.scanner_delays;
        s.set_scanner_delays(d.jump, d.mark, d.polygon)?;
        s.set_mark_speed(config.mark_speed)?;
        s.set_jump_speed(config.jump_speed)?;
        let p = &config.laser_pulses;
        s.set_laser_pulses(p.half_period, p.pulse_length)?;
        s.set_firstpulse_killer(config.first_pulse_killer)?;
        s.set_angle_list(config.beam_angle)?;
        s.set_scanahead_autodelays(config.scanahead_autodelays)?;
        let sh = &config.scanahead_laser_shifts;
        s.set_scanahead_laser_shifts(sh.laser_on, sh.laser_off)?;
        let lp = &config.scanahead_line_params;
        s.set_scanahead_line_params(lp.corner_scale, lp.end_scale, lp.acc_scale)?;
        let w = &config.wobbel_mode;
        s.set_wobbel_mode(w.transversal, w.longitudinal, w.freq, w.mode)?;
        let sw = &config.sky_writing_params;
        s.set_sky_writing_para_list(sw.timelag, sw.laser_on_shift, sw.nprev, sw.npost)?;
        s.set_sky_writing_mode(config.sky_writing_mode)?;
        Ok(())
    }

    pub fn begin_load(&mut self) -> Result<()>
    {
        self.require("begin_load", ListSession::Idle)?;
        debug!("config_list_memory({}, {})", self.list.list_memory, self.list.list_id);
        self.sink.config_list_memory(self.list.list_memory, self.list.list_id)?;
        debug!("init_list_loading({})", self.list.list_id);
        self.sink.init_list_loading(self.list.list_id)?;
        self.state = ListSession::Loading;
        self.loaded = 0;
        Ok(())
    }

    pub fn submit(&mut self, command: &PathCommand) -> Result<()>
    {
        self.require("submit", ListSession::Loading)?;
        if self.loaded >= self.list.capacity() {
            return Err(Error::InvalidShape(
                format!("list {} is full after {} commands",
                        self.list.list_id, self.loaded)));
        }
        debug!("submit {}", command);
        match *command {
            PathCommand::Jump(p) => self.sink.add_jump_to(p.x, p.y)?,
            PathCommand::Line(p) => self.sink.add_line_to(p.x, p.y)?,
            PathCommand::Arc(p, angle) => self.sink.add_arc_to(p.x, p.y, angle)?
        }
        self.loaded += 1;
        Ok(())
    }

    pub fn end_load(&mut self) -> Result<()>
    {
        self.require("end_load", ListSession::Loading)?;
        debug!("set_end_of_list() after {} commands", self.loaded);
        self.sink.set_end_of_list()?;
        self.state = ListSession::Loaded;
        Ok(())
    }

    /// Starts the loaded list. Returns once the card has accepted the start,
    /// not when marking is done.
    pub fn execute(&mut self) -> Result<()>
    {
        self.require("execute", ListSession::Loaded)?;
        info!("Executing list {} ({} commands)", self.list.list_id, self.loaded);
        self.sink.execute_list(self.list.list_id)?;
        self.state = ListSession::Idle;
        self.loaded = 0;
        Ok(())
    }

    /// Applies the settings and loads and starts the shape as one list.
    pub fn run(&mut self, config: &ExecutionListConfig, shape: &Shape) -> Result<()>
    {
        self.require("run", ListSession::Idle)?;
        if shape.len() > self.list.capacity() {
            return Err(Error::InvalidShape(
                format!("{} commands do not fit list memory of {} entries",
                        shape.len(), self.list.list_memory)));
        }
        self.apply_config(config)?;
        self.begin_load()?;
        for cmd in shape {
            self.submit(cmd)?;
        }
        self.end_load()?;
        self.execute()
    }
}
