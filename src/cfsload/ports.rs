use cfsload::{error::AtResult, interface::serialport::available_ports};

pub(crate) fn list_ports() -> AtResult<()> {
    let ports = available_ports()?;
    if ports.is_empty() {
        println!("No serial devices detected");
    }
    for port in ports {
        println!("Found port: '{}'", port);
    }

    Ok(())
}
