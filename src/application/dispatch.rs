//! Chooses which rendering surface drives a flow.
//!
//! This sits in front of the flow controller and never touches its state.
//! Desktop visitors get a QR handoff page with a countdown; mobile visitors
//! (and desktop visitors who choose to continue) go straight into the flow.

use crate::domain::payment::PaymentRequest;
use crate::error::FlowError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use tracing::info;
use url::form_urlencoded;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl FromStr for DeviceClass {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            other => Err(FlowError::ValidationError(format!(
                "Unknown device class: {}",
                other
            ))),
        }
    }
}

/// Checkout payment methods offered before the flow starts.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Paystack,
    GlobalPay,
    Transfer,
    PayByBank,
    PayLater,
    PaySmall,
    Flutterwave,
}

impl PaymentMethod {
    /// Only bank transfers go through payer verification.
    pub fn starts_bank_flow(&self) -> bool {
        matches!(self, PaymentMethod::Transfer | PaymentMethod::PayByBank)
    }
}

impl FromStr for PaymentMethod {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.trim().to_ascii_lowercase().as_str() {
            "paystack" => PaymentMethod::Paystack,
            "globalpay" => PaymentMethod::GlobalPay,
            "transfer" => PaymentMethod::Transfer,
            "mito" | "pay_by_bank" => PaymentMethod::PayByBank,
            "pay_later" => PaymentMethod::PayLater,
            "pay_small" => PaymentMethod::PaySmall,
            "flutterwave" => PaymentMethod::Flutterwave,
            other => {
                return Err(FlowError::ValidationError(format!(
                    "Unknown payment method: {}",
                    other
                )));
            }
        };
        Ok(method)
    }
}

/// Countdown attached to the desktop QR handoff page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffWindow {
    opened_at: DateTime<Utc>,
    timeout: chrono::Duration,
}

impl HandoffWindow {
    pub fn open(opened_at: DateTime<Utc>, timeout: chrono::Duration) -> Self {
        Self { opened_at, timeout }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.opened_at
            .checked_add_signed(self.timeout)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at() - now).max(chrono::Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_zero()
    }

    /// Remaining time as `MM:SS`.
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        let seconds = self.remaining(now).num_seconds();
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(tag = "surface", rename_all = "snake_case")]
pub enum Surface {
    MethodSelection,
    #[serde(rename_all = "camelCase")]
    QrHandoff {
        handoff_url: String,
        display_amount: String,
        expires_at: String,
        countdown: String,
        expired: bool,
    },
    MobileFlow,
    /// Desktop visitor who chose to continue; the mobile flow is framed in a
    /// phone-sized viewport.
    SimulatedMobileFlow,
}

pub struct SurfaceDispatcher {
    device: DeviceClass,
    handoff_base_url: String,
    handoff_timeout: chrono::Duration,
    method: Option<PaymentMethod>,
    window: Option<HandoffWindow>,
    desktop_bypassed: bool,
}

impl SurfaceDispatcher {
    pub fn new(
        device: DeviceClass,
        handoff_base_url: impl Into<String>,
        handoff_timeout: chrono::Duration,
    ) -> Self {
        Self {
            device,
            handoff_base_url: handoff_base_url.into(),
            handoff_timeout,
            method: None,
            window: None,
            desktop_bypassed: false,
        }
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), FlowError> {
        if !method.starts_bank_flow() {
            return Err(FlowError::ValidationError(format!(
                "{:?} is not handled by the pay-by-bank flow",
                method
            )));
        }
        self.method = Some(method);
        Ok(())
    }

    /// Desktop visitor chose to carry on without switching to a phone.
    pub fn continue_on_desktop(&mut self) {
        self.desktop_bypassed = true;
    }

    pub fn window(&self) -> Option<HandoffWindow> {
        self.window
    }

    /// Handoff page address with the ticket reference as a query parameter.
    pub fn handoff_url(&self, ticket_reference: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("ticket", ticket_reference)
            .finish();
        format!("{}?{}", self.handoff_base_url, query)
    }

    pub fn route(&mut self, request: &PaymentRequest, now: DateTime<Utc>) -> Surface {
        if self.method.is_none() {
            return Surface::MethodSelection;
        }

        match self.device {
            DeviceClass::Mobile => Surface::MobileFlow,
            DeviceClass::Desktop if self.desktop_bypassed => Surface::SimulatedMobileFlow,
            DeviceClass::Desktop => {
                let timeout = self.handoff_timeout;
                let window = *self.window.get_or_insert_with(|| {
                    info!(ticket = %request.ticket_reference, "Opening desktop QR handoff");
                    HandoffWindow::open(now, timeout)
                });
                Surface::QrHandoff {
                    handoff_url: self.handoff_url(&request.ticket_reference),
                    display_amount: request.display_amount(),
                    expires_at: window.expires_at().to_rfc3339(),
                    countdown: window.countdown(now),
                    expired: window.is_expired(now),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn request() -> PaymentRequest {
        PaymentRequest::new("BNSCD1234567788TG", dec!(550.00), "GBP")
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_method_gate() {
        let mut dispatcher = SurfaceDispatcher::new(
            DeviceClass::Mobile,
            "https://pay.example.com",
            chrono::Duration::minutes(10),
        );
        assert_eq!(
            dispatcher.route(&request(), start()),
            Surface::MethodSelection
        );

        let rejected = dispatcher.select_method("paystack".parse().unwrap());
        assert!(matches!(rejected, Err(FlowError::ValidationError(_))));
        assert_eq!(
            dispatcher.route(&request(), start()),
            Surface::MethodSelection
        );

        dispatcher.select_method("mito".parse().unwrap()).unwrap();
        assert_eq!(dispatcher.route(&request(), start()), Surface::MobileFlow);
    }

    #[test]
    fn test_desktop_handoff_countdown_and_bypass() {
        let mut dispatcher = SurfaceDispatcher::new(
            DeviceClass::Desktop,
            "https://pay.example.com/flow",
            chrono::Duration::minutes(10),
        );
        dispatcher.select_method(PaymentMethod::Transfer).unwrap();

        let surface = dispatcher.route(&request(), start());
        assert_eq!(
            surface,
            Surface::QrHandoff {
                handoff_url: "https://pay.example.com/flow?ticket=BNSCD1234567788TG".to_string(),
                display_amount: "£ 550.00".to_string(),
                expires_at: "2026-02-01T08:10:00+00:00".to_string(),
                countdown: "10:00".to_string(),
                expired: false,
            }
        );

        // The window opens once; later routes count down from the same start.
        let later = start() + chrono::Duration::seconds(125);
        match dispatcher.route(&request(), later) {
            Surface::QrHandoff { countdown, .. } => assert_eq!(countdown, "07:55"),
            other => panic!("unexpected surface: {:?}", other),
        }

        dispatcher.continue_on_desktop();
        assert_eq!(
            dispatcher.route(&request(), later),
            Surface::SimulatedMobileFlow
        );
    }

    #[test]
    fn test_handoff_window_expiry_clamps_at_zero() {
        let window = HandoffWindow::open(start(), chrono::Duration::minutes(10));
        let after = start() + chrono::Duration::minutes(11);
        assert!(window.is_expired(after));
        assert_eq!(window.countdown(after), "00:00");
        assert!(!window.is_expired(start()));
    }

    #[test]
    fn test_handoff_window_saturates_instead_of_overflowing() {
        let window = HandoffWindow::open(start(), chrono::Duration::MAX);
        assert_eq!(window.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!window.is_expired(start()));
    }

    #[test]
    fn test_handoff_url_encodes_ticket_reference() {
        let mut dispatcher = SurfaceDispatcher::new(
            DeviceClass::Desktop,
            "https://pay.example.com/flow",
            chrono::Duration::minutes(10),
        );
        assert_eq!(
            dispatcher.handoff_url("AB&C #1"),
            "https://pay.example.com/flow?ticket=AB%26C+%231"
        );

        dispatcher.select_method("transfer".parse().unwrap()).unwrap();
        let request = PaymentRequest::new("REF?x=1", dec!(10.00), "GBP");
        match dispatcher.route(&request, start()) {
            Surface::QrHandoff { handoff_url, .. } => {
                assert_eq!(handoff_url, "https://pay.example.com/flow?ticket=REF%3Fx%3D1");
            }
            other => panic!("unexpected surface: {:?}", other),
        }
    }

    #[test]
    fn test_parsing() {
        assert_eq!(
            "Desktop".parse::<DeviceClass>().unwrap(),
            DeviceClass::Desktop
        );
        assert!("tablet".parse::<DeviceClass>().is_err());
        assert!("pay_later".parse::<PaymentMethod>().is_ok());
        assert!(!PaymentMethod::PayLater.starts_bank_flow());
    }
}
