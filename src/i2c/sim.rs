//! Simulated open-drain bus with a register file target, for tests.
//!
//! The target decodes START/STOP, address, bytes and acknowledge bits from
//! the line transitions the controller produces, the way a real device
//! would. It can refuse (NACK) a chosen frame and stretch the clock.

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::Direction;

/// What the target observed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Stop,
    /// Our address was acknowledged.
    Address(Direction),
    /// A byte from the controller was acknowledged.
    Received(u8),
    /// A byte was put on the bus for the controller.
    Sent(u8),
    /// Acknowledge bit from the controller after a sent byte.
    ControllerAck(bool),
    /// A frame was refused.
    Nacked,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Address { byte: u8, bits: u8 },
    Receive { byte: u8, bits: u8 },
    AckOut { then_transmit: bool },
    Transmit { byte: u8, bits: u8 },
    ControllerAck { ack: bool },
    Ignore,
}

struct Target {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    register_selected: bool,
    nack_at: Option<usize>,
    step: usize,
    stretch: u32,
    sda_low: bool,
    state: State,
    events: Vec<Event>,
}

impl Target {
    /// Whether the next acknowledgeable frame is refused.
    fn refuse(&mut self) -> bool {
        let step = self.step;
        self.step += 1;
        self.nack_at == Some(step)
    }

    fn start(&mut self) {
        self.events.push(Event::Start);
        self.sda_low = false;
        self.state = State::Address { byte: 0, bits: 0 };
    }

    fn stop(&mut self) {
        self.events.push(Event::Stop);
        self.sda_low = false;
        self.state = State::Idle;
    }

    fn clock_rise(&mut self, sda: bool) {
        match &mut self.state {
            State::Address { byte, bits } | State::Receive { byte, bits } if *bits < 8 => {
                *byte = (*byte << 1) | sda as u8;
                *bits += 1;
            }
            State::ControllerAck { ack } => *ack = !sda,
            _ => {}
        }
    }

    fn clock_fall(&mut self) {
        let state = self.state;
        match state {
            State::Address { byte, bits: 8 } => {
                if byte >> 1 != self.address {
                    self.state = State::Ignore;
                } else if self.refuse() {
                    self.events.push(Event::Nacked);
                    self.state = State::Ignore;
                } else if byte & 1 == 1 {
                    self.events.push(Event::Address(Direction::Read));
                    self.sda_low = true;
                    self.state = State::AckOut {
                        then_transmit: true,
                    };
                } else {
                    self.events.push(Event::Address(Direction::Write));
                    self.register_selected = false;
                    self.sda_low = true;
                    self.state = State::AckOut {
                        then_transmit: false,
                    };
                }
            }
            State::Receive { byte, bits: 8 } => {
                if self.refuse() {
                    self.events.push(Event::Nacked);
                    self.state = State::Ignore;
                    return;
                }
                self.events.push(Event::Received(byte));
                if self.register_selected {
                    self.registers[self.pointer as usize] = byte;
                    self.pointer = self.pointer.wrapping_add(1);
                } else {
                    self.pointer = byte;
                    self.register_selected = true;
                }
                self.sda_low = true;
                self.state = State::AckOut {
                    then_transmit: false,
                };
            }
            State::AckOut { then_transmit } => {
                self.sda_low = false;
                if then_transmit {
                    self.load_next();
                } else {
                    self.state = State::Receive { byte: 0, bits: 0 };
                }
            }
            State::Transmit { byte, bits } => {
                if bits == 8 {
                    self.sda_low = false;
                    self.state = State::ControllerAck { ack: false };
                } else {
                    self.sda_low = (byte >> (7 - bits)) & 1 == 0;
                    self.state = State::Transmit {
                        byte,
                        bits: bits + 1,
                    };
                }
            }
            State::ControllerAck { ack } => {
                self.events.push(Event::ControllerAck(ack));
                if ack {
                    self.load_next();
                } else {
                    self.state = State::Ignore;
                }
            }
            _ => {}
        }
    }

    fn load_next(&mut self) {
        let byte = self.registers[self.pointer as usize];
        self.pointer = self.pointer.wrapping_add(1);
        self.events.push(Event::Sent(byte));
        self.sda_low = byte & 0x80 == 0;
        self.state = State::Transmit { byte, bits: 1 };
    }
}

struct Bus {
    controller_scl_low: bool,
    controller_sda_low: bool,
    hold: u32,
    scl: bool,
    sda: bool,
    target: Target,
}

impl Bus {
    fn scl_level(&self) -> bool {
        !self.controller_scl_low && self.hold == 0
    }

    fn sda_level(&self) -> bool {
        !(self.controller_sda_low || self.target.sda_low)
    }

    fn settle(&mut self) {
        let scl = self.scl_level();
        if scl != self.scl {
            self.scl = scl;
            if scl {
                let sda = self.sda_level();
                self.target.clock_rise(sda);
            } else {
                self.target.clock_fall();
            }
        }

        let sda = self.sda_level();
        if sda != self.sda {
            self.sda = sda;
            if self.scl {
                if sda {
                    self.target.stop();
                } else {
                    self.target.start();
                }
            }
        }
    }

    fn drive_scl(&mut self, low: bool) {
        if low {
            self.hold = 0;
        } else if self.controller_scl_low {
            self.hold = self.target.stretch;
        }
        self.controller_scl_low = low;
        self.settle();
    }

    fn drive_sda(&mut self, low: bool) {
        self.controller_sda_low = low;
        self.settle();
    }

    fn poll_scl(&mut self) -> bool {
        if self.hold > 0 {
            self.hold -= 1;
            self.settle();
        }
        self.scl
    }

    fn poll_sda(&mut self) -> bool {
        self.sda
    }
}

/// Clock line of the simulated bus.
pub struct SimScl(Rc<RefCell<Bus>>);

/// Data line of the simulated bus.
pub struct SimSda(Rc<RefCell<Bus>>);

/// Inspection and configuration handle for the simulated target.
pub struct SimTarget(Rc<RefCell<Bus>>);

/// Build an idle bus with a target at `address`.
pub fn bus(address: u8) -> (SimScl, SimSda, SimTarget) {
    let bus = Rc::new(RefCell::new(Bus {
        controller_scl_low: false,
        controller_sda_low: false,
        hold: 0,
        scl: true,
        sda: true,
        target: Target {
            address,
            registers: [0; 256],
            pointer: 0,
            register_selected: false,
            nack_at: None,
            step: 0,
            stretch: 0,
            sda_low: false,
            state: State::Idle,
            events: Vec::new(),
        },
    }));
    (
        SimScl(bus.clone()),
        SimSda(bus.clone()),
        SimTarget(bus),
    )
}

impl SimTarget {
    /// Refuse the `step`th acknowledgeable frame, counting address frames
    /// and received bytes from zero.
    pub fn nack_at(&self, step: usize) {
        let mut bus = self.0.borrow_mut();
        bus.target.nack_at = Some(step);
        bus.target.step = 0;
    }

    /// Hold SCL low for `polls` reads after every release.
    pub fn stretch(&self, polls: u32) {
        self.0.borrow_mut().target.stretch = polls;
    }

    pub fn set_register(&self, register: u8, value: u8) {
        self.0.borrow_mut().target.registers[register as usize] = value;
    }

    pub fn register(&self, register: u8) -> u8 {
        self.0.borrow().target.registers[register as usize]
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().target.events.clone()
    }

    pub fn clear_events(&self) {
        self.0.borrow_mut().target.events.clear();
    }

    /// Bytes written by the controller, in order.
    pub fn received(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Received(byte) => Some(byte),
                _ => None,
            })
            .collect()
    }

    /// Both lines released and high.
    pub fn is_idle(&self) -> bool {
        let bus = self.0.borrow();
        bus.scl && bus.sda && !bus.controller_scl_low && !bus.controller_sda_low
    }
}

impl ErrorType for SimScl {
    type Error = Infallible;
}

impl OutputPin for SimScl {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().drive_scl(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().drive_scl(false);
        Ok(())
    }
}

impl InputPin for SimScl {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.borrow_mut().poll_scl())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow_mut().poll_scl())
    }
}

impl ErrorType for SimSda {
    type Error = Infallible;
}

impl OutputPin for SimSda {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().drive_sda(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().drive_sda(false);
        Ok(())
    }
}

impl InputPin for SimSda {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.borrow_mut().poll_sda())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow_mut().poll_sda())
    }
}
