pub mod traits;
pub mod udp;

pub use traits::DatagramChannel;
pub use udp::UdpChannel;
