/*!

Payload types exchanged between the AMI refresh agents, the workflow that sequences them, and the
image build pipeline's notifications.

!*/

mod payloads;

pub use payloads::*;
