mod message_format;
mod proxy_binding;
