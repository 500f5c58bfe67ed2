mod formatter;
mod sink;
mod writer;

pub use formatter::{Formatter, JsonFormatter, TextFormatter};
pub use sink::{
    check_delivered, Delivery, DeliveryReport, FanoutSink, Publisher, SampleSink, WriterSink,
};
pub use writer::{LineWriter, Writer};
