//! Topic naming for the site transport.
//!
//! Every topic is `{prefix}/{device}/{field}`.  Devices publish
//! `temperature`, `humidity`, `battery` and `error`; the controller
//! publishes `state` plus `duration` (pump) or `target` (heater).

use crate::error::IngestError;
use crate::store::{Device, Metric};

/// Outbound field names.
pub const STATE: &str = "state";
pub const DURATION: &str = "duration";
pub const TARGET: &str = "target";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMap {
    prefix: String,
}

impl TopicMap {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve an inbound topic to the device and metric it carries.
    pub fn route(&self, topic: &str) -> Result<(Device, Metric), IngestError> {
        let unknown = || IngestError::UnknownTopic(topic.to_owned());
        let mut parts = topic.split('/');
        let (Some(prefix), Some(device), Some(metric), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unknown());
        };
        if prefix != self.prefix {
            return Err(unknown());
        }
        let device = device.parse::<Device>().map_err(|_| unknown())?;
        let metric = metric.parse::<Metric>().map_err(|_| unknown())?;
        Ok((device, metric))
    }

    pub fn topic(&self, device: Device, field: &str) -> String {
        format!("{}/{}/{}", self.prefix, device.name(), field)
    }

    /// Every topic the controller listens on.
    pub fn subscriptions(&self) -> Vec<String> {
        let mut topics = Vec::new();
        for device in Device::ALL {
            for metric in Metric::ALL {
                let is_actuator = matches!(device, Device::Pump | Device::Heater);
                if is_actuator && matches!(metric, Metric::Temperature | Metric::Humidity) {
                    continue;
                }
                topics.push(self.topic(device, metric.name()));
            }
        }
        topics
    }
}
