use crate::error::{self, Result};
use crate::services::ParameterService;
use log::debug;
use snafu::OptionExt;

/// Reads the value of the stack parameter `key` from `stack_name`, searching every page of the
/// stack description. For the refresh agents this value is the name of the SSM parameter that
/// tracks the latest EKS optimized AMI, which also tells us the AMI family.
/// The first matching parameter wins; later pages are not requested once it is found.
pub async fn stack_parameter_value<P>(parameters: &P, stack_name: &str, key: &str) -> Result<String>
where
    P: ParameterService + ?Sized,
{
    let mut next_token = None;
    loop {
        let page = parameters.stack_parameters(stack_name, next_token).await?;
        if let Some(value) = page
            .items
            .into_iter()
            .find(|parameter| parameter.key == key)
            .and_then(|parameter| parameter.value)
        {
            debug!("Stack '{}' parameter '{}' is '{}'", stack_name, key, value);
            return Ok(value);
        }
        next_token = page.next_token;
        if next_token.is_none() {
            break;
        }
    }
    None.context(error::StackParameterMissingSnafu { stack_name, key })
}
