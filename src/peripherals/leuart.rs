//! Interrupt-driven LEUART transmitter
//!
//! Streams a caller-supplied byte string one byte per transmit-buffer-level
//! (TXBL) interrupt, then waits for transmit-complete (TXC) before reporting.
//!
//! ```text
//!  start()        arm TXBL                          EnTx
//!  TXBL           re-arm TXBL                       TxData
//!  TXBL           write byte[index++]               TxData
//!  TXBL (last)    write byte, TXBL off, TXC on      EndTx
//!  TXC            TXC off, post completion, EM3 off EnTx
//! ```

use heapless::Vec;

use crate::core::scheduler::{EventId, EventRegister};
use crate::core::sleep::{EnergyMode, SleepArbiter};
use crate::platform::traits::{SerialIrq, SerialPort, UartConfig};
use crate::platform::Result;

/// Energy mode blocked while a string is being sent (LEUART stops in EM3)
pub const LEUART_TX_EM: EnergyMode = EnergyMode::Em3;

/// Longest string one `start` accepts
pub const TX_CAPACITY: usize = 80;

/// Transmit progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    /// Ready for a new string, or armed and waiting for the first TXBL
    EnTx,
    /// Streaming bytes
    TxData,
    /// Last byte loaded, waiting for the shift register to drain
    EndTx,
}

/// Interrupt-driven LEUART transmit driver
pub struct LeuartTx<'a, S: SerialPort> {
    port: S,
    events: &'a EventRegister,
    sleep: &'a SleepArbiter,
    state: TxState,
    buffer: Vec<u8, TX_CAPACITY>,
    index: usize,
    busy: bool,
    completion: Option<EventId>,
}

impl<'a, S: SerialPort> LeuartTx<'a, S> {
    /// Configure the port and drop any stale transmit flags
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the frame format is not supported.
    pub fn open(
        mut port: S,
        config: UartConfig,
        events: &'a EventRegister,
        sleep: &'a SleepArbiter,
    ) -> Result<Self> {
        config.validate()?;
        port.configure(&config)?;
        port.clear_interrupts(SerialIrq::TXBL | SerialIrq::TXC);

        crate::log_debug!("leuart: open at {} baud", config.baud_rate);
        Ok(Self {
            port,
            events,
            sleep,
            state: TxState::EnTx,
            buffer: Vec::new(),
            index: 0,
            busy: false,
            completion: None,
        })
    }

    /// Send `bytes`, posting `completion` once the last bit has left the pin
    ///
    /// # Panics
    ///
    /// Fatal if a string is already being sent, or `bytes` is empty or longer
    /// than [`TX_CAPACITY`].
    pub fn start(&mut self, bytes: &[u8], completion: EventId) {
        if self.busy {
            crate::fatal!("leuart: start while {:?}", self.state);
        }
        if bytes.is_empty() {
            crate::fatal!("leuart: empty transmit");
        }
        let Ok(buffer) = Vec::from_slice(bytes) else {
            crate::fatal!("leuart: {} bytes exceeds capacity", bytes.len());
        };

        self.sleep.vote_busy(LEUART_TX_EM);

        self.buffer = buffer;
        self.index = 0;
        self.completion = Some(completion);
        self.state = TxState::EnTx;
        self.busy = true;

        crate::log_trace!("leuart: sending {} bytes", self.buffer.len());
        self.port.enable_interrupts(SerialIrq::TXBL);
    }

    /// Interrupt entry: decode pending flags and step the state machine
    pub fn on_interrupt(&mut self) {
        let flags = self.port.take_interrupts();

        if flags.contains(SerialIrq::TXBL) {
            self.on_buffer_level();
        }
        if flags.contains(SerialIrq::TXC) {
            self.on_tx_complete();
        }
    }

    /// Transmit buffer has room for another byte
    pub fn on_buffer_level(&mut self) {
        match self.state {
            TxState::EnTx if self.busy => {
                self.port.clear_interrupts(SerialIrq::TXBL);
                self.port.enable_interrupts(SerialIrq::TXBL);
                self.set_state(TxState::TxData);
            }
            TxState::TxData => {
                self.port.write(self.buffer[self.index]);
                self.index += 1;
                if self.index == self.buffer.len() {
                    self.port.disable_interrupts(SerialIrq::TXBL);
                    self.port.clear_interrupts(SerialIrq::TXC);
                    self.port.enable_interrupts(SerialIrq::TXC);
                    self.set_state(TxState::EndTx);
                }
            }
            _ => crate::fatal!("leuart: unexpected TXBL in {:?}", self.state),
        }
    }

    /// Shift register drained after the last byte
    pub fn on_tx_complete(&mut self) {
        match (self.state, self.completion) {
            (TxState::EndTx, Some(completion)) => {
                self.port.disable_interrupts(SerialIrq::TXC);
                self.events.post(completion);
                self.sleep.vote_idle(LEUART_TX_EM);
                self.busy = false;
                self.set_state(TxState::EnTx);
            }
            _ => crate::fatal!("leuart: unexpected TXC in {:?}", self.state),
        }
    }

    /// A string is being sent
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Bytes of the current (or last) string already handed to the hardware
    pub fn sent(&self) -> &[u8] {
        &self.buffer[..self.index]
    }

    pub fn port(&self) -> &S {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }

    fn set_state(&mut self, next: TxState) {
        crate::log_trace!("leuart: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::error::UartError;
    use crate::platform::mock::MockSerial;
    use crate::platform::PlatformError;

    const TX_DONE: EventId = EventId::new(4);

    fn open<'a>(events: &'a EventRegister, sleep: &'a SleepArbiter) -> LeuartTx<'a, MockSerial> {
        LeuartTx::open(MockSerial::new(), UartConfig::default(), events, sleep).unwrap()
    }

    #[test]
    fn test_open_configures_and_clears_flags() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let tx = open(&events, &sleep);
        assert_eq!(tx.port().baud_rate(), Some(9600));
        assert_eq!(tx.port().cleared(), [SerialIrq::TXBL | SerialIrq::TXC]);
        assert_eq!(tx.port().enabled(), SerialIrq::empty());
        assert_eq!(tx.state(), TxState::EnTx);
        assert!(!tx.is_busy());
    }

    #[test]
    fn test_open_rejects_fast_baud() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let config = UartConfig {
            baud_rate: 115_200,
            ..UartConfig::default()
        };
        let result = LeuartTx::open(MockSerial::new(), config, &events, &sleep);
        assert!(matches!(
            result,
            Err(PlatformError::Uart(UartError::InvalidBaudRate))
        ));
    }

    #[test]
    fn test_two_byte_sequence() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);

        tx.start(b"AB", TX_DONE);
        assert!(tx.is_busy());
        assert_eq!(sleep.votes(LEUART_TX_EM), 1);
        assert_eq!(tx.port().enabled(), SerialIrq::TXBL);

        tx.on_buffer_level();
        assert_eq!(tx.state(), TxState::TxData);
        assert!(tx.port().tx_buffer().is_empty());

        tx.on_buffer_level();
        assert_eq!(tx.port().tx_buffer(), b"A");
        assert_eq!(tx.state(), TxState::TxData);

        tx.on_buffer_level();
        assert_eq!(tx.port().tx_buffer(), b"AB");
        assert_eq!(tx.state(), TxState::EndTx);
        assert_eq!(tx.port().enabled(), SerialIrq::TXC);
        assert!(events.pending().is_empty());

        tx.on_tx_complete();
        assert_eq!(tx.state(), TxState::EnTx);
        assert!(!tx.is_busy());
        assert_eq!(tx.port().enabled(), SerialIrq::empty());
        assert!(events.is_pending(TX_DONE));
        assert_eq!(sleep.votes(LEUART_TX_EM), 0);
        assert_eq!(tx.sent(), b"AB");
    }

    #[test]
    fn test_restart_after_completion() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);

        tx.start(b"AB", TX_DONE);
        for _ in 0..3 {
            tx.on_buffer_level();
        }
        tx.on_tx_complete();

        tx.start(b"C", TX_DONE);
        assert_eq!(tx.sent(), b"");
        tx.on_buffer_level();
        tx.on_buffer_level();
        tx.on_tx_complete();
        assert_eq!(tx.port().tx_buffer(), b"ABC");
        assert_eq!(sleep.votes(LEUART_TX_EM), 0);
    }

    #[test]
    fn test_interrupt_flags_drive_the_sequence() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);

        tx.start(b"Temp = 21.5 C\n", TX_DONE);
        while tx.state() != TxState::EndTx {
            tx.port_mut().raise(SerialIrq::TXBL);
            tx.on_interrupt();
        }
        tx.port_mut().raise(SerialIrq::TXC);
        tx.on_interrupt();

        assert_eq!(tx.port().tx_buffer(), b"Temp = 21.5 C\n");
        assert!(events.is_pending(TX_DONE));
    }

    #[test]
    fn test_full_capacity_string() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);

        let bytes = [b'x'; TX_CAPACITY];
        tx.start(&bytes, TX_DONE);
        for _ in 0..=TX_CAPACITY {
            tx.on_buffer_level();
        }
        assert_eq!(tx.state(), TxState::EndTx);
        assert_eq!(tx.port().tx_buffer().len(), TX_CAPACITY);
    }

    #[test]
    #[should_panic(expected = "start while TxData")]
    fn test_start_while_busy_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.start(b"AB", TX_DONE);
        tx.on_buffer_level();
        tx.start(b"CD", TX_DONE);
    }

    #[test]
    #[should_panic(expected = "empty transmit")]
    fn test_empty_string_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.start(b"", TX_DONE);
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn test_oversized_string_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.start(&[0u8; TX_CAPACITY + 1], TX_DONE);
    }

    #[test]
    #[should_panic(expected = "unexpected TXC in TxData")]
    fn test_early_tx_complete_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.start(b"AB", TX_DONE);
        tx.on_buffer_level();
        tx.on_tx_complete();
    }

    #[test]
    #[should_panic(expected = "unexpected TXC in EnTx")]
    fn test_tx_complete_while_idle_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.on_tx_complete();
    }

    #[test]
    #[should_panic(expected = "unexpected TXC in EnTx")]
    fn test_tx_complete_before_first_buffer_level_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.start(b"AB", TX_DONE);
        tx.on_tx_complete();
    }

    #[test]
    #[should_panic(expected = "unexpected TXBL in EndTx")]
    fn test_buffer_level_after_last_byte_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.start(b"A", TX_DONE);
        tx.on_buffer_level();
        tx.on_buffer_level();
        tx.on_buffer_level();
    }

    #[test]
    #[should_panic(expected = "unexpected TXBL in EnTx")]
    fn test_buffer_level_while_idle_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut tx = open(&events, &sleep);
        tx.on_buffer_level();
    }
}
