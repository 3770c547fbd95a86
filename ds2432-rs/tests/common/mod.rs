#![allow(dead_code)]
//! Byte level model of a single DS2432 on a 1-Wire bus.

use std::collections::VecDeque;

use ds2432::{
    Secret,
    mac::{self, PAGE_DATA_LEN},
};
use embedded_hal::delay::DelayNs;
use embedded_onewire::{OneWire, OneWireCrc16, OneWireError, OneWireResult, OneWireStatus};

pub const ROM: u64 = 0x44060504030201b3;

const MEMORY_SIZE: usize = 0x98;
const SECRET: usize = 0x80;
const REGISTERS: usize = 0x88;

#[derive(Debug, Default)]
pub struct Faults {
    /// Flip this bit of the write scratchpad frame as the device receives it.
    pub corrupt_write_bit: Option<usize>,
    /// Flip this bit of the read scratchpad frame as the device sends it.
    pub corrupt_read_bit: Option<usize>,
    /// Report this target address from read scratchpad.
    pub echo_address: Option<u16>,
    /// Report the partial flag from read scratchpad.
    pub partial: bool,
    /// Store the first scratchpad byte inverted.
    pub alter_data: bool,
    /// Answer copy scratchpad with this byte and commit nothing.
    pub copy_status: Option<u8>,
    /// Answer load first secret with this byte and load nothing.
    pub load_status: Option<u8>,
    /// Refuse the MAC of copies to this address.
    pub reject_copy_at: Option<u16>,
    /// No presence pulse.
    pub absent: bool,
}

#[derive(Debug)]
enum State {
    Idle,
    MatchRom(Vec<u8>),
    Selected,
    Command(u8, Vec<u8>),
    Reading,
    Ignoring,
}

#[derive(Debug)]
pub struct SimStatus {
    presence: bool,
}

impl OneWireStatus for SimStatus {
    fn presence(&self) -> bool {
        self.presence
    }

    fn shortcircuit(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct SimDs2432 {
    pub rom: u64,
    pub memory: [u8; MEMORY_SIZE],
    pub scratchpad: [u8; 8],
    pub target: u16,
    pub es: u8,
    pub faults: Faults,
    pub pullup_supported: bool,
    /// Bytes written while the strong pull-up was armed.
    pub powered: Vec<u8>,
    /// Target address of every write scratchpad.
    pub scratchpad_writes: Vec<u16>,
    /// Target address of every copy scratchpad, accepted or not.
    pub copies: Vec<u16>,
    /// Number of resets seen.
    pub resets: usize,
    pullup_armed: bool,
    state: State,
    rx: VecDeque<u8>,
}

impl Default for SimDs2432 {
    fn default() -> Self {
        Self::new(ROM)
    }
}

impl SimDs2432 {
    pub fn new(rom: u64) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[REGISTERS + 3] = 0x55; // factory byte
        memory[REGISTERS + 6..REGISTERS + 8].copy_from_slice(&[0x34, 0x12]);
        memory[REGISTERS + 8..].copy_from_slice(&rom.to_le_bytes());
        Self {
            rom,
            memory,
            scratchpad: [0xff; 8],
            target: 0,
            es: 0,
            faults: Faults::default(),
            pullup_supported: true,
            powered: Vec::new(),
            scratchpad_writes: Vec::new(),
            copies: Vec::new(),
            resets: 0,
            pullup_armed: false,
            state: State::Idle,
            rx: VecDeque::new(),
        }
    }

    pub fn with_secret(mut self, secret: [u8; 8]) -> Self {
        self.memory[SECRET..SECRET + 8].copy_from_slice(&secret);
        self
    }

    pub fn with_data(mut self, address: usize, data: &[u8]) -> Self {
        self.memory[address..address + data.len()].copy_from_slice(data);
        self
    }

    pub fn secret(&self) -> [u8; 8] {
        let mut secret = [0; 8];
        secret.copy_from_slice(&self.memory[SECRET..SECRET + 8]);
        secret
    }

    pub fn data(&self, address: usize, len: usize) -> &[u8] {
        &self.memory[address..address + len]
    }

    pub fn set_register(&mut self, address: usize, value: u8) {
        self.memory[address] = value;
    }

    fn respond(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
        self.state = State::Reading;
    }

    fn page_protected(&self, target: u16) -> bool {
        let activated = |b: u8| b == 0xaa || b == 0x55;
        activated(self.memory[REGISTERS + 1])
            || (target < 0x20 && activated(self.memory[REGISTERS + 5]))
    }

    fn select(&mut self, byte: u8) {
        match byte {
            0x55 => self.state = State::MatchRom(Vec::new()),
            0xcc => self.state = State::Selected,
            0x33 => {
                let rom = self.rom.to_le_bytes();
                self.respond(&rom);
            }
            _ => self.state = State::Ignoring,
        }
    }

    fn command(&mut self, cmd: u8, frame: &[u8]) -> bool {
        match (cmd, frame.len()) {
            (0xf0, 2) => {
                let address = u16::from_le_bytes([frame[0], frame[1]]) as usize;
                let mut out = Vec::new();
                for a in address..MEMORY_SIZE {
                    out.push(if (SECRET..REGISTERS).contains(&a) {
                        0xff
                    } else {
                        self.memory[a]
                    });
                }
                self.respond(&out);
                true
            }
            (0x0f, 10) => {
                let mut received = vec![cmd];
                received.extend_from_slice(frame);
                if let Some(bit) = self.faults.corrupt_write_bit {
                    received[bit / 8] ^= 1 << (bit % 8);
                }
                self.target = u16::from_le_bytes([received[1], received[2]]);
                self.scratchpad.copy_from_slice(&received[3..]);
                if self.faults.alter_data {
                    self.scratchpad[0] ^= 0xff;
                }
                self.es = 0x07;
                self.scratchpad_writes.push(self.target);
                let crc = OneWireCrc16::inverted(&received);
                self.respond(&crc);
                true
            }
            (0xaa, 0) => {
                let address = self.faults.echo_address.unwrap_or(self.target);
                let es = if self.faults.partial {
                    self.es | 0x20
                } else {
                    self.es
                };
                let data = if (SECRET..REGISTERS).contains(&(self.target as usize)) {
                    [0xff; 8]
                } else {
                    self.scratchpad
                };
                let mut sent = vec![cmd];
                sent.extend_from_slice(&address.to_le_bytes());
                sent.push(es);
                sent.extend_from_slice(&data);
                let crc = OneWireCrc16::inverted(&sent);
                if let Some(bit) = self.faults.corrupt_read_bit {
                    sent[bit / 8] ^= 1 << (bit % 8);
                }
                sent.extend_from_slice(&crc);
                self.respond(&sent[1..]);
                true
            }
            (0x5a, 3) => {
                let authorized = frame == [self.target as u8, (self.target >> 8) as u8, self.es]
                    && self.target == SECRET as u16;
                let status = if let Some(status) = self.faults.load_status {
                    status
                } else if authorized {
                    self.memory[SECRET..SECRET + 8].copy_from_slice(&self.scratchpad);
                    self.es |= 0x80;
                    0xaa
                } else {
                    0xff
                };
                self.respond(&[status]);
                true
            }
            (0x55, 23) => {
                let target = self.target;
                self.copies.push(target);
                let authorized = frame[..3] == [target as u8, (target >> 8) as u8, self.es];
                let base = (target & !0x1f) as usize;
                let mut page = [0; PAGE_DATA_LEN];
                page.copy_from_slice(&self.memory[base..base + PAGE_DATA_LEN]);
                let message = mac::build_message(
                    &Secret::new(self.secret()),
                    &self.scratchpad,
                    target,
                    &page,
                    &self.rom.to_le_bytes(),
                );
                let expected = mac::transform(&message).to_bytes();
                let status = if let Some(status) = self.faults.copy_status {
                    status
                } else if !authorized
                    || frame[3..] != expected
                    || self.faults.reject_copy_at == Some(target)
                {
                    0x00
                } else if self.page_protected(target) {
                    0xff
                } else {
                    let target = target as usize;
                    self.memory[target..target + 8].copy_from_slice(&self.scratchpad);
                    self.es |= 0x80;
                    0xaa
                };
                self.respond(&[status]);
                true
            }
            (0xf0 | 0x0f | 0x5a | 0x55, _) => false,
            _ => {
                self.state = State::Ignoring;
                true
            }
        }
    }
}

impl OneWire for SimDs2432 {
    type Status = SimStatus;
    type BusError = core::convert::Infallible;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        self.resets += 1;
        self.pullup_armed = false;
        self.rx.clear();
        self.state = State::Idle;
        if self.faults.absent {
            return Err(OneWireError::NoDevicePresent);
        }
        Ok(SimStatus { presence: true })
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        if std::mem::take(&mut self.pullup_armed) {
            self.powered.push(byte);
        }
        match std::mem::replace(&mut self.state, State::Ignoring) {
            State::Idle => self.select(byte),
            State::MatchRom(mut rom) => {
                rom.push(byte);
                self.state = if rom.len() < 8 {
                    State::MatchRom(rom)
                } else if rom == self.rom.to_le_bytes() {
                    State::Selected
                } else {
                    State::Ignoring
                };
            }
            State::Selected => {
                if !self.command(byte, &[]) {
                    self.state = State::Command(byte, Vec::new());
                }
            }
            State::Command(cmd, mut frame) => {
                frame.push(byte);
                if !self.command(cmd, &frame) {
                    self.state = State::Command(cmd, frame);
                }
            }
            State::Reading => self.state = State::Reading,
            State::Ignoring => {}
        }
        Ok(())
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        Ok(self.rx.pop_front().unwrap_or(0xff))
    }

    fn get_overdrive_mode(&mut self) -> bool {
        false
    }

    fn strong_pullup(&mut self) -> OneWireResult<(), Self::BusError> {
        if !self.pullup_supported {
            return Err(OneWireError::Unimplemented);
        }
        self.pullup_armed = true;
        Ok(())
    }
}

/// Delay provider that records the requested waits.
#[derive(Debug, Default)]
pub struct Clock {
    pub waits_ms: Vec<u32>,
    pub waited_ns: u64,
}

impl DelayNs for Clock {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
        self.waited_ns += u64::from(ms) * 1_000_000;
    }
}
